//! Day fingerprints for change detection.
//!
//! A fingerprint is the set of `(video id, has real summary)` pairs for a
//! day. Comparing fingerprints tells the caller which days need their
//! digest regenerated without diffing summary text: a day changes when a
//! video is added or removed, or when a video gains (or loses) a usable
//! summary.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Dataset, Day};

/// Prefix written in place of a summary when generation gave up.
pub const SUMMARY_FAILURE_MARKER: &str = "Summary generation failed";

/// Order-independent identity of a day's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayFingerprint(BTreeSet<(String, bool)>);

impl DayFingerprint {
    pub fn of(day: &Day) -> Self {
        Self(
            day.videos()
                .map(|v| (v.id.clone(), has_real_summary(&v.summary)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Non-empty and not a failure marker.
pub fn has_real_summary(summary: &str) -> bool {
    !summary.is_empty() && !summary.starts_with(SUMMARY_FAILURE_MARKER)
}

/// Dates of `merged` days that are new or whose fingerprint differs from
/// the same date in `prior`, in `merged` order.
pub fn changed_days(prior: &Dataset, merged: &Dataset) -> Vec<String> {
    let before: HashMap<&str, DayFingerprint> = prior
        .days
        .iter()
        .map(|d| (d.date.as_str(), DayFingerprint::of(d)))
        .collect();

    merged
        .days
        .iter()
        .filter(|d| before.get(d.date.as_str()) != Some(&DayFingerprint::of(d)))
        .map(|d| d.date.clone())
        .collect()
}

/// Dates present in `prior` but absent from `merged`, in `prior` order.
pub fn dropped_days(prior: &Dataset, merged: &Dataset) -> Vec<String> {
    prior
        .days
        .iter()
        .filter(|d| merged.find_day(&d.date).is_none())
        .map(|d| d.date.clone())
        .collect()
}
