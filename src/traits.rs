//! Collaborator traits for the pipeline.
//!
//! The pipeline only talks to the outside world through these traits, so
//! tests (and alternative platforms) can swap in their own sources.
//!
//! ```text
//! channel URLs ──▶ ChannelResolver ──▶ FeedSource ──▶ filter + merge
//!                                                         │
//!                                  DigestGenerator ◀──────┤ changed days
//!                                                         ▼
//!                                                       Store
//! ```
//!
//! Built-in implementations:
//!
//! | Trait | Implementation |
//! |-------|----------------|
//! | [`ChannelResolver`] | [`crate::resolver::HttpChannelResolver`] |
//! | [`FeedSource`] | [`crate::feed::HttpFeedSource`] |
//! | [`DigestGenerator`] | [`crate::digest::GeminiDigestGenerator`] |

use anyhow::Result;
use async_trait::async_trait;

use crate::models::SourceVideo;

/// A channel URL paired with its platform id and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub url: String,
    pub channel_id: String,
    pub channel_name: String,
}

/// Turns configured channel URLs into [`ResolvedChannel`]s.
///
/// Channels that cannot be resolved are left out of the result; the
/// pipeline reports the shortfall as a run issue.
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    async fn resolve(&self, urls: &[String]) -> Vec<ResolvedChannel>;
}

/// Lists recent videos for resolved channels.
///
/// Returns only videos published inside the `days_to_show` window. A
/// channel whose feed fails contributes nothing; it is not an error.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, channels: &[ResolvedChannel], days_to_show: u32) -> Vec<SourceVideo>;
}

/// Writes the cross-video roundup for a day.
#[async_trait]
pub trait DigestGenerator: Send + Sync {
    /// Returns the digest text. Implementations that give up after retries
    /// return a failure-marker string instead of an error, so that
    /// [`is_failure`](DigestGenerator::is_failure) can recognise it.
    async fn daily_digest(&self, date: &str, summaries: &[String]) -> Result<String>;

    fn is_failure(&self, digest: &str) -> bool {
        digest.starts_with(crate::models::SUMMARY_FAILURE_MARKER)
    }
}
