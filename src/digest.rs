//! Daily digest generation.
//!
//! Writes a short roundup for a day from the real summaries of its videos,
//! using the Gemini `generateContent` API.
//!
//! # Retry Strategy
//!
//! - HTTP 429 and 5xx → retry after 5s, 10s, 20s (last delay repeats)
//! - Network error → retry
//! - Other HTTP 4xx → give up immediately
//!
//! Giving up is not an error: the generator returns
//! [`DIGEST_FAILURE_MESSAGE`], which starts with the summary failure marker,
//! so the next run sees the day as lacking a real digest and tries again.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, warn};

use crate::config::AiConfig;
use crate::models::SUMMARY_FAILURE_MARKER;
use crate::traits::DigestGenerator;

pub const DIGEST_FAILURE_MESSAGE: &str = "Summary generation failed — will retry next run.";

/// Placeholder some summarizers write when no transcript could be fetched.
pub const TRANSCRIPT_UNAVAILABLE: &str = "Transcript not available";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const RETRY_DELAYS_SECS: [u64; 3] = [5, 10, 20];

/// True for summaries worth feeding into a digest.
pub fn is_digestible_summary(summary: &str) -> bool {
    !summary.is_empty()
        && !summary.starts_with(SUMMARY_FAILURE_MARKER)
        && !summary.starts_with(TRANSCRIPT_UNAVAILABLE)
}

pub fn build_digest_prompt(date: &str, summaries: &[String]) -> String {
    format!(
        "Write a brief 2-3 sentence news roundup for {} based on these AI video summaries:\n\n{}",
        date,
        summaries.join("\n\n")
    )
}

pub struct GeminiDigestGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl GeminiDigestGenerator {
    /// Fails when the API key variable is unset or the model is missing.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let env_var = config
            .api_key_env_var
            .as_deref()
            .ok_or_else(|| anyhow!("ai.api_key_env_var required"))?;
        let api_key = std::env::var(env_var).map_err(|_| {
            anyhow!(
                "Environment variable '{}' is not set. Set it with: export {}=your-api-key",
                env_var,
                env_var
            )
        })?;
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("ai.model required"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            max_retries: config.max_retries.max(1),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let mut last_err = None;

        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                let idx = (attempt as usize - 2).min(RETRY_DELAYS_SECS.len() - 1);
                tokio::time::sleep(Duration::from_secs(RETRY_DELAYS_SECS[idx])).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_generate_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(attempt, max = self.max_retries, %status, "Gemini API attempt failed");
                        last_err = Some(anyhow!("Gemini API error {}: {}", status, body_text));
                        continue;
                    }

                    bail!("Gemini API error {}: {}", status, body_text);
                }
                Err(e) => {
                    warn!(attempt, max = self.max_retries, error = %e, "Gemini API attempt failed");
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Gemini API call failed after retries")))
    }
}

#[async_trait]
impl DigestGenerator for GeminiDigestGenerator {
    async fn daily_digest(&self, date: &str, summaries: &[String]) -> Result<String> {
        let prompt = build_digest_prompt(date, summaries);
        match self.generate(&prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                error!(%date, error = %e, "digest generation gave up");
                Ok(DIGEST_FAILURE_MESSAGE.to_string())
            }
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn parse_generate_response(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing candidates[0].content.parts"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        bail!("Invalid Gemini response: empty text");
    }
    Ok(text)
}
