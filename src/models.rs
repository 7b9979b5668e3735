//! Data types used throughout feedroll.
//!
//! The dataset shapes live in `feedroll-core` so the merge engine can be
//! tested without any I/O; they are re-exported here for the pipeline and
//! the CLI.

pub use feedroll_core::fingerprint::SUMMARY_FAILURE_MARKER;
pub use feedroll_core::models::{
    ChannelGroup, Dataset, DatasetConfig, Day, PipelineStatus, RunState, SourceVideo, Video,
};
