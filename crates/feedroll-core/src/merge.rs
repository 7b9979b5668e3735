//! Windowed merge engine.
//!
//! Combines the videos of a prior [`Dataset`] with newly discovered videos
//! and regroups everything into days and channels, dropping days that have
//! fallen out of the retention window.
//!
//! # Algorithm
//!
//! 1. Flatten the prior dataset into [`SourceVideo`]s, re-attaching each
//!    video's owning channel name and URL.
//! 2. Append the new videos. The first occurrence of an id wins, so the
//!    output never holds an id twice even if the caller skipped the filter.
//! 3. `cutoff = today - days_to_show`, formatted `YYYY-MM-DD`.
//! 4. Partition by the first ten characters of `publishedAt` and drop any
//!    partition whose key sorts before `cutoff`.
//! 5. Sub-partition by channel name. Videos without a name go to
//!    [`UNKNOWN_CHANNEL`].
//! 6. Resolve each channel's URL from a single pass over all videos (first
//!    non-empty URL per name wins).
//! 7. Emit days newest first, channels by name, videos newest first. A day
//!    that existed before keeps its digest.
//!
//! The prior dataset is only read. The result is a fresh value.
//!
//! Channels are keyed by display name: a channel renamed between runs
//! starts a new grouping and its older days keep the old name.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate};

use crate::models::{ChannelGroup, Dataset, DatasetConfig, Day, SourceVideo, Video};

/// Grouping key for videos whose source did not name the channel.
pub const UNKNOWN_CHANNEL: &str = "Unknown";

/// Merge `prior` with `new_videos` under a `days_to_show` window ending at
/// `today` (UTC date).
///
/// `lastUpdated` and `pipelineStatus` are carried over from `prior`; only the
/// store stamps write times. `config` is replaced with the active window.
pub fn merge_and_group(
    prior: &Dataset,
    new_videos: Vec<SourceVideo>,
    days_to_show: u32,
    today: NaiveDate,
) -> Dataset {
    let cutoff = cutoff_date(today, days_to_show);

    let mut all_videos = flatten(prior);
    all_videos.extend(new_videos);

    let mut seen: HashSet<String> = HashSet::with_capacity(all_videos.len());
    all_videos.retain(|v| seen.insert(v.video.id.clone()));

    // First URL seen for each channel, including channels that are about
    // to lose every video to the window.
    let mut channel_urls: HashMap<String, String> = HashMap::new();
    for v in &all_videos {
        let url = channel_urls.entry(channel_key(v).to_string()).or_default();
        if url.is_empty() && !v.channel_url.is_empty() {
            *url = v.channel_url.clone();
        }
    }

    let mut by_date: BTreeMap<String, BTreeMap<String, Vec<Video>>> = BTreeMap::new();
    for v in all_videos {
        let date = date_key(&v.video.published_at);
        if date < cutoff.as_str() {
            continue;
        }
        let date = date.to_string();
        let channel = channel_key(&v).to_string();
        by_date
            .entry(date)
            .or_default()
            .entry(channel)
            .or_default()
            .push(v.video);
    }

    let prior_digests: HashMap<&str, &str> = prior
        .days
        .iter()
        .map(|d| (d.date.as_str(), d.daily_digest.as_str()))
        .collect();

    let days = by_date
        .into_iter()
        .rev()
        .map(|(date, channels)| {
            let channels = channels
                .into_iter()
                .map(|(name, mut videos)| {
                    videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                    ChannelGroup {
                        channel_url: channel_urls.get(&name).cloned().unwrap_or_default(),
                        channel_name: name,
                        videos,
                    }
                })
                .collect();
            Day {
                daily_digest: prior_digests
                    .get(date.as_str())
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                date,
                channels,
            }
        })
        .collect();

    Dataset {
        last_updated: prior.last_updated.clone(),
        config: DatasetConfig {
            days_to_show: Some(days_to_show),
        },
        days,
        pipeline_status: prior.pipeline_status.clone(),
        extra: prior.extra.clone(),
    }
}

/// Nested dataset → flat, channel-tagged videos.
pub fn flatten(dataset: &Dataset) -> Vec<SourceVideo> {
    dataset
        .days
        .iter()
        .flat_map(|day| day.channels.iter())
        .flat_map(|ch| {
            ch.videos.iter().map(move |v| SourceVideo {
                video: v.clone(),
                channel_name: Some(ch.channel_name.clone()),
                channel_url: ch.channel_url.clone(),
            })
        })
        .collect()
}

/// Oldest day key still inside the window. A window reaching past the
/// calendar's start clamps to [`NaiveDate::MIN`], which keeps every day.
pub fn cutoff_date(today: NaiveDate, days_to_show: u32) -> String {
    today
        .checked_sub_days(Days::new(u64::from(days_to_show)))
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

/// `YYYY-MM-DD` prefix of an ISO-8601 timestamp. No timezone conversion.
pub fn date_key(published_at: &str) -> &str {
    match published_at.char_indices().nth(10) {
        Some((idx, _)) => &published_at[..idx],
        None => published_at,
    }
}

fn channel_key(v: &SourceVideo) -> &str {
    match v.channel_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_CHANNEL,
    }
}
