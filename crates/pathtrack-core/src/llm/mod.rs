//! Optional LLM-assisted extraction.
//!
//! The model is asked for `{"rows": [...]}` and its answer is mapped through
//! the same record reader as JSON uploads, so dates and ranges are normalized
//! identically on both paths.

pub mod openai;

use crate::error::PathtrackError;
use crate::model::MeasurementRow;
use crate::structured::json::rows_from_value;
use serde_json::Value;
use std::time::Duration;

pub use openai::OpenAiClient;

pub const SYSTEM_PROMPT: &str = r#"Return ONLY JSON: { "rows": [{"date","test","value","unit","ref_range"}] }"#;

const USER_PROMPT_PREFIX: &str = "Extract pathology results from the text.\n\nTEXT:\n";

/// A chat-completion backend that returns the model's raw text answer.
pub trait LlmClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, PathtrackError>;
}

/// Retry schedule for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(800),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after the given (zero-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `op`, retrying with exponential backoff while it fails with a
/// rate-limit error. Any other error is returned at once.
pub fn with_backoff<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T, PathtrackError>
where
    F: FnMut() -> Result<T, PathtrackError>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op() {
            Err(e) if e.is_rate_limited() && attempt + 1 < attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, retrying"
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub fn user_prompt(text: &str) -> String {
    format!("{USER_PROMPT_PREFIX}{text}")
}

/// Map the model's answer to rows. Invalid records are dropped; an answer
/// that is not JSON at all is an error.
pub fn parse_llm_response(raw: &str) -> Result<Vec<MeasurementRow>, PathtrackError> {
    let data: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| PathtrackError::LlmResponse(e.to_string()))?;
    Ok(rows_from_value(&data))
}

/// Models sometimes wrap JSON in a markdown fence despite being told not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Extract rows from document text with the model.
pub fn extract_rows(
    client: &dyn LlmClient,
    policy: &RetryPolicy,
    text: &str,
) -> Result<Vec<MeasurementRow>, PathtrackError> {
    let prompt = user_prompt(text);
    let raw = with_backoff(policy, || client.complete(SYSTEM_PROMPT, &prompt))?;
    let rows = parse_llm_response(&raw)?;
    tracing::info!(rows = rows.len(), "model extraction complete");
    Ok(rows)
}
