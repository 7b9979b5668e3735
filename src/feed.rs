//! Channel feed fetching.
//!
//! Each resolved channel's public Atom feed is fetched and parsed with
//! `quick-xml`. Only entries published inside the window are kept.
//!
//! A feed entry looks like:
//!
//! ```xml
//! <entry>
//!   <id>yt:video:dQw4w9WgXcQ</id>
//!   <title>Some title</title>
//!   <link rel="alternate" href="https://www.youtube.com/watch?v=dQw4w9WgXcQ"/>
//!   <published>2026-02-26T08:00:00+00:00</published>
//!   <media:group><media:title>Some title</media:title>…</media:group>
//! </entry>
//! ```
//!
//! The video id is the last `:`-separated segment of `<id>`. Entries with
//! a malformed id or an unparseable `<published>` are skipped with a
//! warning. A channel whose feed cannot be fetched, or parses to nothing,
//! contributes no videos; the pipeline reports it.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::FetchConfig;
use crate::models::{SourceVideo, Video};
use crate::progress::{FetchProgressEvent, NoProgress, ProgressReporter};
use crate::traits::{FeedSource, ResolvedChannel};

const FEED_URL_BASE: &str = "https://www.youtube.com/feeds/videos.xml?channel_id=";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed parse error: {0}")]
    Parse(String),
}

/// One `<entry>` as it appears in the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub id: String,
    pub title: Option<String>,
    pub published: String,
    pub link: Option<String>,
}

pub struct HttpFeedSource {
    client: reqwest::Client,
    delay: Duration,
    progress: Box<dyn ProgressReporter>,
}

impl HttpFeedSource {
    pub fn new(fetch: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            delay: Duration::from_millis(fetch.request_delay_ms),
            progress: Box::new(NoProgress),
        })
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    async fn fetch_entries(&self, channel_id: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let xml = self
            .client
            .get(feed_url(channel_id))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_feed(&xml)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, channels: &[ResolvedChannel], days_to_show: u32) -> Vec<SourceVideo> {
        let cutoff = window_start(Utc::now(), days_to_show);
        let total = channels.len() as u64;
        let mut all_videos = Vec::new();

        for (i, channel) in channels.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.delay).await;
            }
            self.progress.report(FetchProgressEvent::Fetching {
                channel: channel.channel_name.clone(),
                n: i as u64 + 1,
                total,
            });

            match self.fetch_entries(&channel.channel_id).await {
                Ok(entries) => {
                    let videos = entries_to_videos(entries, channel, cutoff);
                    info!(
                        channel = %channel.channel_name,
                        videos = videos.len(),
                        days_to_show,
                        "fetched feed"
                    );
                    all_videos.extend(videos);
                }
                Err(e) => warn!(channel = %channel.channel_name, error = %e, "failed to fetch feed"),
            }
        }

        all_videos
    }
}

/// Earliest publish time kept for a `days_to_show` window ending at `now`.
/// Clamps to the earliest representable time instead of overflowing.
pub fn window_start(now: DateTime<Utc>, days_to_show: u32) -> DateTime<Utc> {
    now.checked_sub_signed(ChronoDuration::days(i64::from(days_to_show)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn feed_url(channel_id: &str) -> String {
    format!("{}{}", FEED_URL_BASE, channel_id)
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[derive(Clone, Copy)]
enum Field {
    Id,
    Title,
    Published,
}

/// Parse an Atom document into its entries.
///
/// A document that breaks partway through still yields the entries read
/// before the error; it is only an error if nothing usable was read.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"entry" => current = Some(FeedEntry::default()),
                b"id" if current.is_some() => field = Some(Field::Id),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"published" if current.is_some() => field = Some(Field::Published),
                b"link" => read_link(&e, current.as_mut()),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"link" {
                    read_link(&e, current.as_mut());
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(f), Some(entry)) = (field, current.as_mut()) {
                    let text = t.unescape().map_err(|e| FeedError::Parse(e.to_string()))?;
                    match f {
                        Field::Id => entry.id.push_str(&text),
                        Field::Title => entry.title.get_or_insert_with(String::new).push_str(&text),
                        Field::Published => entry.published.push_str(&text),
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    field = None;
                }
                b"id" | b"title" | b"published" => field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                if entries.is_empty() {
                    return Err(FeedError::Parse(e.to_string()));
                }
                warn!(error = %e, entries = entries.len(), "feed truncated, keeping parsed entries");
                break;
            }
            _ => {}
        }
    }

    Ok(entries)
}

fn read_link(e: &BytesStart<'_>, entry: Option<&mut FeedEntry>) {
    let Some(entry) = entry else { return };
    if entry.link.is_some() {
        return;
    }
    let rel = e
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    if matches!(rel.as_deref(), None | Some("alternate")) {
        entry.link = e
            .try_get_attribute("href")
            .ok()
            .flatten()
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    }
}

/// Convert feed entries for `channel` into videos published at or after
/// `cutoff`.
pub fn entries_to_videos(
    entries: Vec<FeedEntry>,
    channel: &ResolvedChannel,
    cutoff: DateTime<Utc>,
) -> Vec<SourceVideo> {
    let mut videos = Vec::with_capacity(entries.len());

    for entry in entries {
        let published = match DateTime::parse_from_rfc3339(entry.published.trim()) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                warn!(published = %entry.published, "skipping entry with unparseable date");
                continue;
            }
        };
        if published < cutoff {
            continue;
        }

        let Some((_, video_id)) = entry.id.rsplit_once(':') else {
            warn!(id = %entry.id, "skipping entry with missing/malformed id");
            continue;
        };
        if video_id.is_empty() {
            continue;
        }

        videos.push(SourceVideo {
            video: Video {
                id: video_id.to_string(),
                title: entry.title.unwrap_or_else(|| "Untitled".to_string()),
                published_at: entry.published,
                duration: None,
                thumbnail_url: thumbnail_url(video_id),
                video_url: entry.link.unwrap_or_else(|| watch_url(video_id)),
                summary: String::new(),
                transcript_available: false,
            },
            channel_name: Some(channel.channel_name.clone()),
            channel_url: channel.url.clone(),
        });
    }

    videos
}
