//! Dataset models shared by the merge engine, the stores, and the CLI.
//!
//! The persisted shape is nested (`Dataset → Day → ChannelGroup → Video`)
//! and serialized as camelCase JSON. [`SourceVideo`] is the flat,
//! channel-tagged form that feed fetches produce and that the merge engine
//! works on internally.

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single video as stored under its channel grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// ISO-8601 timestamp. The first ten characters are the day key.
    #[serde(default)]
    pub published_at: String,
    /// Length in seconds, when the source reports one.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub transcript_available: bool,
}

fn default_title() -> String {
    "Untitled".to_string()
}

/// A video tagged with the channel it came from.
///
/// Produced by feed sources and by flattening a persisted [`Dataset`].
/// `channel_name` is `None` when the source could not name the channel;
/// such videos are grouped under [`crate::merge::UNKNOWN_CHANNEL`].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVideo {
    pub video: Video,
    pub channel_name: Option<String>,
    pub channel_url: String,
}

impl SourceVideo {
    pub fn id(&self) -> &str {
        &self.video.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelGroup {
    pub channel_name: String,
    #[serde(default)]
    pub channel_url: String,
    #[serde(default)]
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Cross-video roundup written by the digest generator. Empty when none.
    #[serde(default)]
    pub daily_digest: String,
    #[serde(default)]
    pub channels: Vec<ChannelGroup>,
}

impl Day {
    pub fn videos(&self) -> impl Iterator<Item = &Video> {
        self.channels.iter().flat_map(|ch| ch.videos.iter())
    }
}

/// Echo of the window the dataset was last merged with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_to_show: Option<u32>,
}

/// `ok` or `partial`. Any other stored value is kept verbatim in `Other`
/// so a document written by a different producer still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunState {
    Ok,
    Partial,
    Other(String),
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Ok => "ok",
            RunState::Partial => "partial",
            RunState::Other(s) => s,
        }
    }
}

impl From<String> for RunState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ok" => RunState::Ok,
            "partial" => RunState::Partial,
            _ => RunState::Other(s),
        }
    }
}

impl From<RunState> for String {
    fn from(state: RunState) -> Self {
        state.as_str().to_string()
    }
}

/// Outcome of the run that produced the dataset, for display by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub status: RunState,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl PipelineStatus {
    /// `ok` with no issues, `partial` otherwise.
    pub fn from_issues(issues: Vec<String>) -> Self {
        let status = if issues.is_empty() {
            RunState::Ok
        } else {
            RunState::Partial
        };
        Self { status, issues }
    }
}

/// The persisted document.
///
/// `days` is required when deserializing: a document without it is treated
/// as unusable by the stores and replaced by [`Dataset::empty`]. A malformed
/// `pipelineStatus` is dropped rather than failing the load, and unknown
/// top-level keys are kept in `extra` and written back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub config: DatasetConfig,
    pub days: Vec<Day>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_status"
    )]
    pub pipeline_status: Option<PipelineStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<PipelineStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl Dataset {
    /// `{lastUpdated: null, config: {}, days: []}`
    pub fn empty() -> Self {
        Self {
            last_updated: None,
            config: DatasetConfig::default(),
            days: Vec::new(),
            pipeline_status: None,
            extra: Map::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Multi-line JSON. Non-ASCII text is written literally.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn videos(&self) -> impl Iterator<Item = &Video> {
        self.days.iter().flat_map(|day| day.videos())
    }

    pub fn video_count(&self) -> usize {
        self.videos().count()
    }

    pub fn find_day(&self, date: &str) -> Option<&Day> {
        self.days.iter().find(|d| d.date == date)
    }
}
