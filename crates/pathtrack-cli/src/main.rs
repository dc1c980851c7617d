mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pathtrack",
    version,
    about = "Extract dated measurements from pathology reports and keep a history"
)]
struct Cli {
    /// TOML settings file (defaults apply when absent)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a report (PDF, image, text, CSV, TSV or JSON) into rows without saving
    Parse {
        /// Path to the report
        input_file: PathBuf,

        /// Input kind (default: from the extension)
        #[arg(short, long, value_enum)]
        kind: Option<commands::KindArg>,

        /// Extract rows with the language model instead of the line parser
        #[arg(long)]
        llm: bool,

        /// Fill missing units, categories and ranges from this store
        #[arg(long, value_name = "STORE")]
        history: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed rows to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Parse a report, complete it from history, and save the rows
    Import {
        /// Path to the report
        input_file: PathBuf,

        /// JSON store file holding the measurement history
        #[arg(short, long, value_name = "STORE")]
        store: PathBuf,

        /// Input kind (default: from the extension)
        #[arg(short, long, value_enum)]
        kind: Option<commands::KindArg>,

        /// Extract rows with the language model instead of the line parser
        #[arg(long)]
        llm: bool,
    },
    /// Export the stored history as CSV
    Export {
        /// JSON store file holding the measurement history
        #[arg(short, long, value_name = "STORE")]
        store: PathBuf,

        /// Write CSV to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let config = match pathtrack_core::config::Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Parse {
            input_file,
            kind,
            llm,
            history,
            output,
            out,
        } => commands::parse::run(
            &config,
            input_file,
            kind,
            llm,
            history,
            &output,
            out,
        ),
        Commands::Import {
            input_file,
            store,
            kind,
            llm,
        } => commands::import::run(&config, input_file, store, kind, llm),
        Commands::Export { store, out } => commands::export::run(store, out),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
