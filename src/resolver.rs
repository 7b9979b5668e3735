//! Channel URL resolution.
//!
//! Feeds are keyed by channel id (`UC` + 22 characters), but configs list
//! human URLs (`/@handle`, `/c/name`, `/channel/UC…`). URLs that already
//! contain the id are resolved locally; anything else is fetched and the id
//! is pulled out of the page HTML, trying in order:
//!
//! 1. `<meta property="og:url" content="…">`
//! 2. `<link rel="canonical" href="…">`
//! 3. any `/channel/UC…` reference in the page
//!
//! The display name used for grouping comes from the URL, not the page.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::FetchConfig;
use crate::traits::{ChannelResolver, ResolvedChannel};

pub struct HttpChannelResolver {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpChannelResolver {
    pub fn new(fetch: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            delay: Duration::from_millis(fetch.request_delay_ms),
        })
    }

    async fn lookup(&self, url: &str) -> Result<Option<String>> {
        let html = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract_channel_id_from_html(&html))
    }
}

#[async_trait]
impl ChannelResolver for HttpChannelResolver {
    async fn resolve(&self, urls: &[String]) -> Vec<ResolvedChannel> {
        let mut resolved = Vec::with_capacity(urls.len());

        for url in urls {
            if let Some(id) = find_channel_id(url) {
                info!(%url, channel_id = %id, "resolved (direct)");
                resolved.push(ResolvedChannel {
                    url: url.clone(),
                    channel_id: id,
                    channel_name: channel_name_from_url(url),
                });
                continue;
            }

            tokio::time::sleep(self.delay).await;
            match self.lookup(url).await {
                Ok(Some(id)) => {
                    info!(%url, channel_id = %id, "resolved");
                    resolved.push(ResolvedChannel {
                        url: url.clone(),
                        channel_id: id,
                        channel_name: channel_name_from_url(url),
                    });
                }
                Ok(None) => warn!(%url, "could not extract channel id"),
                Err(e) => warn!(%url, error = %e, "failed to resolve channel"),
            }
        }

        resolved
    }
}

static RE_CHANNEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/channel/(UC[\w-]{22})").unwrap());
static RE_OG_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s+property="og:url"\s+content="([^"]*)""#).unwrap()
});
static RE_CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<link\s+rel="canonical"\s+href="([^"]*)""#).unwrap());
static RE_NAME_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"@([\w-]+)").unwrap(),
        Regex::new(r"/c/([\w-]+)").unwrap(),
        Regex::new(r"/channel/([\w-]+)").unwrap(),
    ]
});

/// Channel id from page HTML, preferring the page's own canonical URLs.
pub fn extract_channel_id_from_html(html: &str) -> Option<String> {
    for tag in [&*RE_OG_URL, &*RE_CANONICAL] {
        if let Some(id) = tag
            .captures(html)
            .and_then(|cap| find_channel_id(&cap[1]))
        {
            return Some(id);
        }
    }
    find_channel_id(html)
}

/// First `/channel/UC` followed by 22 id characters.
pub fn find_channel_id(text: &str) -> Option<String> {
    RE_CHANNEL_ID
        .captures(text)
        .map(|cap| cap[1].to_string())
}

/// Readable name from `@handle`, `/c/name` or `/channel/ID`, else the URL.
pub fn channel_name_from_url(url: &str) -> String {
    RE_NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(url).map(|cap| cap[1].to_string()))
        .unwrap_or_else(|| url.to_string())
}
