//! Run orchestration.
//!
//! One run is a single pass through:
//!
//! 1. load the stored dataset (empty if none)
//! 2. resolve channel URLs, stopping early without a write if none resolve
//! 3. fetch every channel's feed
//! 4. keep only videos not already stored
//! 5. merge them in under the window (skipped when nothing is new)
//! 6. when AI is enabled, regenerate digests for changed days and for days
//!    still lacking a real digest (a failed attempt is retried here)
//! 7. record run issues in `pipelineStatus` and save atomically
//!
//! Per-channel failures never abort a run; they become issue strings in the
//! saved dataset and the returned [`RunReport`]. Any other error propagates
//! before the save, so the stored dataset is left untouched.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{info, warn};

use feedroll_core::filter::{existing_video_ids, filter_new_videos};
use feedroll_core::fingerprint::{changed_days, has_real_summary};
use feedroll_core::merge::merge_and_group;
use feedroll_core::store::Store;

use crate::config::Config;
use crate::digest::{is_digestible_summary, GeminiDigestGenerator};
use crate::feed::HttpFeedSource;
use crate::file_store::JsonFileStore;
use crate::models::{Dataset, PipelineStatus};
use crate::progress::{FetchProgressEvent, ProgressMode, ProgressReporter};
use crate::resolver::HttpChannelResolver;
use crate::traits::{ChannelResolver, DigestGenerator, FeedSource};

/// Issues collected during a run.
#[derive(Debug, Default, Clone)]
pub struct RunStatus {
    issues: Vec<String>,
}

impl RunStatus {
    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!(issue = %msg, "run issue");
        self.issues.push(msg);
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn to_pipeline_status(&self) -> PipelineStatus {
        PipelineStatus::from_issues(self.issues.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing resolved; the stored dataset was not touched.
    NoChannels,
    /// Nothing new; the stored dataset was re-saved with a fresh status.
    NoNewVideos,
    Merged,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub resolved_channels: usize,
    pub fetched: usize,
    pub new_videos: usize,
    pub days: usize,
    pub changed_days: Vec<String>,
    pub digests_written: usize,
    pub issues: Vec<String>,
    pub written: bool,
}

impl RunReport {
    fn new(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            resolved_channels: 0,
            fetched: 0,
            new_videos: 0,
            days: 0,
            changed_days: Vec::new(),
            digests_written: 0,
            issues: Vec::new(),
            written: false,
        }
    }
}

/// Everything a run talks to.
pub struct Collaborators<'a> {
    pub store: &'a dyn Store,
    pub resolver: &'a dyn ChannelResolver,
    pub feed: &'a dyn FeedSource,
    pub digest: Option<&'a dyn DigestGenerator>,
    pub progress: &'a dyn ProgressReporter,
}

/// `feedroll run`: build the HTTP collaborators and the file store from
/// config, run once, and print the report.
pub async fn run_pipeline(config: &Config, dry_run: bool, progress: ProgressMode) -> Result<RunReport> {
    let store = JsonFileStore::new(&config.data.path);
    let resolver = HttpChannelResolver::new(&config.fetch)?;
    let feed = HttpFeedSource::new(&config.fetch)?.with_progress(progress.reporter());
    let reporter = progress.reporter();

    let mut status = RunStatus::default();
    let gemini = if config.ai.is_enabled() {
        match GeminiDigestGenerator::from_config(&config.ai) {
            Ok(g) => Some(g),
            Err(e) => {
                status.warn(format!("AI digests unavailable: {}", e));
                None
            }
        }
    } else {
        None
    };

    let collab = Collaborators {
        store: &store,
        resolver: &resolver,
        feed: &feed,
        digest: gemini.as_ref().map(|g| g as &dyn DigestGenerator),
        progress: reporter.as_ref(),
    };

    let today = Utc::now().date_naive();
    let report = run_pipeline_with(config, &collab, status, dry_run, today).await?;
    print_report(&report, dry_run);
    Ok(report)
}

/// Run once against the given collaborators. `status` may already carry
/// issues from setup; `today` is the UTC date the window ends on.
pub async fn run_pipeline_with(
    config: &Config,
    collab: &Collaborators<'_>,
    mut status: RunStatus,
    dry_run: bool,
    today: NaiveDate,
) -> Result<RunReport> {
    let window = config.display.window_days();

    let existing = collab.store.load();
    let existing_ids = existing_video_ids(&existing);
    info!(videos = existing_ids.len(), "loaded existing data");

    collab.progress.report(FetchProgressEvent::Resolving {
        total: config.channels.len() as u64,
    });
    let channels = collab.resolver.resolve(&config.channels).await;
    if channels.is_empty() {
        warn!("no channels resolved, exiting without writing");
        let mut report = RunReport::new(RunOutcome::NoChannels);
        report.issues = status.issues().to_vec();
        return Ok(report);
    }

    let failed_channels = config.channels.len().saturating_sub(channels.len());
    if failed_channels > 0 {
        status.warn(format!("{} channel(s) could not be resolved", failed_channels));
    }

    let all_videos = collab.feed.fetch(&channels, window).await;
    info!(videos = all_videos.len(), "fetched feeds");

    let seen_channels: HashSet<&str> = all_videos
        .iter()
        .filter_map(|v| v.channel_name.as_deref())
        .collect();
    let feed_failed: Vec<&str> = channels
        .iter()
        .map(|c| c.channel_name.as_str())
        .filter(|name| !seen_channels.contains(name))
        .collect();
    if !feed_failed.is_empty() {
        status.warn(format!("RSS unavailable for: {}", feed_failed.join(", ")));
    }

    let fetched = all_videos.len();
    let new_videos = filter_new_videos(all_videos, &existing_ids);

    let mut report = RunReport::new(RunOutcome::Merged);
    report.resolved_channels = channels.len();
    report.fetched = fetched;
    report.new_videos = new_videos.len();

    if new_videos.is_empty() {
        info!("no new videos, keeping existing data");
        let mut dataset = existing;
        if let Some(generator) = collab.digest {
            report.digests_written =
                regenerate_digests(generator, &mut dataset, &[], &mut status).await?;
        }
        dataset.pipeline_status = Some(status.to_pipeline_status());
        report.outcome = RunOutcome::NoNewVideos;
        report.days = dataset.days.len();
        report.issues = status.issues().to_vec();
        if !dry_run {
            collab.store.save(&mut dataset)?;
            report.written = true;
        }
        return Ok(report);
    }

    info!(videos = new_videos.len(), "merging new videos");
    collab.progress.report(FetchProgressEvent::Merging {
        new_videos: new_videos.len() as u64,
    });
    let mut merged = merge_and_group(&existing, new_videos, window, today);
    let changed = changed_days(&existing, &merged);

    if let Some(generator) = collab.digest {
        report.digests_written =
            regenerate_digests(generator, &mut merged, &changed, &mut status).await?;
    }

    merged.pipeline_status = Some(status.to_pipeline_status());
    report.days = merged.days.len();
    report.changed_days = changed;
    report.issues = status.issues().to_vec();

    if !dry_run {
        collab.store.save(&mut merged)?;
        report.written = true;
    }

    info!(
        new_videos = report.new_videos,
        days = report.days,
        "run complete"
    );
    if !report.issues.is_empty() {
        info!(issues = %report.issues.join("; "), "run issues");
    }
    Ok(report)
}

/// Rewrite the digest of every day that changed or has no real digest yet,
/// provided it has at least one usable summary. Returns the number of
/// digests written successfully.
async fn regenerate_digests(
    generator: &dyn DigestGenerator,
    dataset: &mut Dataset,
    changed: &[String],
    status: &mut RunStatus,
) -> Result<usize> {
    let mut written = 0;
    let mut failed = 0;

    let targets = dataset
        .days
        .iter_mut()
        .filter(|d| changed.contains(&d.date) || !has_real_summary(&d.daily_digest));
    for day in targets {
        let summaries: Vec<String> = day
            .videos()
            .filter(|v| is_digestible_summary(&v.summary))
            .map(|v| v.summary.clone())
            .collect();
        if summaries.is_empty() {
            continue;
        }

        info!(date = %day.date, summaries = summaries.len(), "regenerating daily digest");
        let digest = generator.daily_digest(&day.date, &summaries).await?;
        if generator.is_failure(&digest) {
            failed += 1;
        } else {
            written += 1;
        }
        day.daily_digest = digest;
    }

    if failed > 0 {
        status.warn(format!("AI digests failed for {} day(s)", failed));
    }
    Ok(written)
}

fn print_report(report: &RunReport, dry_run: bool) {
    println!("run{}", if dry_run { " (dry-run)" } else { "" });
    match report.outcome {
        RunOutcome::NoChannels => {
            println!("  no channels resolved, nothing written");
        }
        RunOutcome::NoNewVideos | RunOutcome::Merged => {
            println!("  channels resolved: {}", report.resolved_channels);
            println!("  videos fetched: {}", report.fetched);
            println!("  new videos: {}", report.new_videos);
            println!("  days: {}", report.days);
            if !report.changed_days.is_empty() {
                println!("  changed days: {}", report.changed_days.join(", "));
            }
            if report.digests_written > 0 {
                println!("  digests written: {}", report.digests_written);
            }
        }
    }
    for issue in &report.issues {
        println!("  issue: {}", issue);
    }
    println!("ok");
}
