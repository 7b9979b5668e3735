//! Run progress reporting.
//!
//! A run spends nearly all of its time waiting on the network, one channel
//! at a time. Progress is emitted on **stderr** so stdout (the run report)
//! stays parseable for scripts and schedulers.

use std::io::Write;

/// A single progress event during `feedroll run`.
#[derive(Clone, Debug)]
pub enum FetchProgressEvent {
    /// Resolving channel URLs (total known, no per-channel detail).
    Resolving { total: u64 },
    /// Fetching feed `n` of `total`.
    Fetching { channel: String, n: u64, total: u64 },
    /// Merging `new_videos` into the stored dataset.
    Merging { new_videos: u64 },
}

/// Reports run progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: FetchProgressEvent);
}

/// Human-friendly progress on stderr: "fetch  3 / 12 channels  Fireship".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: FetchProgressEvent) {
        let line = match &event {
            FetchProgressEvent::Resolving { total } => {
                format!("resolve  {} channel URLs...\n", format_number(*total))
            }
            FetchProgressEvent::Fetching { channel, n, total } => format!(
                "fetch  {} / {} channels  {}\n",
                format_number(*n),
                format_number(*total),
                channel
            ),
            FetchProgressEvent::Merging { new_videos } => {
                format!("merge  {} new videos\n", format_number(*new_videos))
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: FetchProgressEvent) {
        let obj = match &event {
            FetchProgressEvent::Resolving { total } => serde_json::json!({
                "event": "progress",
                "phase": "resolving",
                "total": total
            }),
            FetchProgressEvent::Fetching { channel, n, total } => serde_json::json!({
                "event": "progress",
                "phase": "fetching",
                "channel": channel,
                "n": n,
                "total": total
            }),
            FetchProgressEvent::Merging { new_videos } => serde_json::json!({
                "event": "progress",
                "phase": "merging",
                "new_videos": new_videos
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: FetchProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off. Scheduled runs
    /// usually have no TTY and only get the log lines.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// `auto`, `off`, `human`, or `json`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "auto" => Ok(Self::default_for_tty()),
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "invalid progress mode '{}': expected auto, off, human, or json",
                other
            )),
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
