//! Dataset statistics and change preview.
//!
//! `feedroll stats` gives a quick read of the persisted dataset: when it was
//! last written, how many days, channels and videos it holds, and whether
//! the last run was clean. `feedroll changed` re-applies today's window to
//! the stored data and shows which days a run would touch, without writing.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use feedroll_core::fingerprint::{changed_days, dropped_days, has_real_summary};
use feedroll_core::merge::merge_and_group;
use feedroll_core::store::Store;

use crate::config::Config;
use crate::file_store::JsonFileStore;
use crate::models::Dataset;

/// Per-day breakdown row.
struct DayStats {
    date: String,
    channels: usize,
    videos: usize,
    summarized: usize,
    has_digest: bool,
}

impl DayStats {
    fn collect(dataset: &Dataset) -> Vec<DayStats> {
        dataset
            .days
            .iter()
            .map(|day| DayStats {
                date: day.date.clone(),
                channels: day.channels.len(),
                videos: day.videos().count(),
                summarized: day.videos().filter(|v| has_real_summary(&v.summary)).count(),
                has_digest: has_real_summary(&day.daily_digest),
            })
            .collect()
    }
}

/// Run the stats command: load the dataset and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let store = JsonFileStore::new(&config.data.path);
    let dataset = store.load();
    print!("{}", render_stats(&dataset, &store.path().display().to_string(), Utc::now()));
    Ok(())
}

fn render_stats(dataset: &Dataset, path: &str, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    let channels: std::collections::BTreeSet<&str> = dataset
        .days
        .iter()
        .flat_map(|d| d.channels.iter().map(|c| c.channel_name.as_str()))
        .collect();

    line("feedroll — Dataset Stats".to_string());
    line("========================".to_string());
    line(String::new());
    line(format!("  Data file:     {}", path));
    line(format!(
        "  Last updated:  {}",
        match dataset.last_updated.as_deref() {
            Some(ts) => format_ts_relative(ts, now),
            None => "never".to_string(),
        }
    ));
    line(format!(
        "  Window:        {}",
        match dataset.config.days_to_show {
            Some(n) => format!("{} day{}", n, if n == 1 { "" } else { "s" }),
            None => "unset".to_string(),
        }
    ));
    line(String::new());
    line(format!("  Days:          {}", dataset.days.len()));
    line(format!("  Channels:      {}", channels.len()));
    line(format!("  Videos:        {}", dataset.video_count()));

    let days = DayStats::collect(dataset);
    if !days.is_empty() {
        line(String::new());
        line("  By day:".to_string());
        line(format!(
            "  {:<12} {:>8} {:>6} {:>10}   {}",
            "DATE", "CHANNELS", "VIDEOS", "SUMMARIZED", "DIGEST"
        ));
        line(format!("  {}", "-".repeat(50)));
        for d in &days {
            line(format!(
                "  {:<12} {:>8} {:>6} {:>10}   {}",
                d.date,
                d.channels,
                d.videos,
                d.summarized,
                if d.has_digest { "yes" } else { "no" }
            ));
        }
    }

    if let Some(status) = &dataset.pipeline_status {
        line(String::new());
        line(format!("  Last run:      {}", status.status.as_str()));
        for issue in &status.issues {
            line(format!("    - {}", issue));
        }
    }

    out
}

/// Run the changed command: preview which stored days today's window would
/// rewrite or drop. Never writes.
pub fn run_changed(config: &Config) -> Result<()> {
    let store = JsonFileStore::new(&config.data.path);
    let prior = store.load();
    let today = Utc::now().date_naive();
    print!(
        "{}",
        render_changed(&prior, config.display.window_days(), today)
    );
    Ok(())
}

fn render_changed(prior: &Dataset, window: u32, today: NaiveDate) -> String {
    let merged = merge_and_group(prior, Vec::new(), window, today);
    let changed = changed_days(prior, &merged);
    let dropped = dropped_days(prior, &merged);

    let mut out = format!("changed (window {} days, today {})\n", window, today);
    if changed.is_empty() && dropped.is_empty() {
        out.push_str("  nothing to do\n");
        return out;
    }
    for date in &changed {
        out.push_str(&format!("  changed  {}\n", date));
    }
    for date in &dropped {
        out.push_str(&format!("  dropped  {}\n", date));
    }
    out
}

/// Format a `lastUpdated` stamp as a relative time string (e.g. "3 hours ago").
/// Unparseable stamps are shown as-is.
fn format_ts_relative(ts: &str, now: DateTime<Utc>) -> String {
    let parsed = match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => return ts.to_string(),
    };
    let delta = (now - parsed).num_seconds();

    if delta < 0 {
        return format_ts_iso(parsed);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(parsed)
    }
}

fn format_ts_iso(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
