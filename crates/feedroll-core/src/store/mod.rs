//! Persistence abstraction for the dataset.
//!
//! The [`Store`] trait is the seam between the pipeline and wherever the
//! dataset lives. Implementations must honour two rules:
//!
//! | Method | Contract |
//! |--------|----------|
//! | [`load`](Store::load) | Return the last saved dataset, or [`Dataset::empty`] when there is none or it cannot be read. Never fails. |
//! | [`save`](Store::save) | Stamp `lastUpdated`, then replace the stored dataset atomically. On error the previous dataset must be left exactly as it was. |
//!
//! The pipeline assumes a single writer for the duration of a run and does
//! no locking of its own.

pub mod memory;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::Dataset;

pub trait Store: Send + Sync {
    fn load(&self) -> Dataset;

    fn save(&self, dataset: &mut Dataset) -> Result<()>;
}

/// `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Set `lastUpdated` to the current UTC time. Called by stores right
/// before they commit a write.
pub fn stamp_last_updated(dataset: &mut Dataset) {
    dataset.last_updated = Some(format_timestamp(Utc::now()));
}
