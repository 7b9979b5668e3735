//! In-memory [`Store`] for tests.
//!
//! Holds the dataset behind a `Mutex`. A store built with
//! [`InMemoryStore::failing`] rejects every save, which lets callers check
//! that a failed run leaves the previous dataset untouched.

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::models::Dataset;

use super::{stamp_last_updated, Store};

pub struct InMemoryStore {
    dataset: Mutex<Option<Dataset>>,
    saves: Mutex<usize>,
    fail_saves: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            dataset: Mutex::new(None),
            saves: Mutex::new(0),
            fail_saves: false,
        }
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Mutex::new(Some(dataset)),
            ..Self::new()
        }
    }

    pub fn failing(dataset: Dataset) -> Self {
        Self {
            fail_saves: true,
            ..Self::with_dataset(dataset)
        }
    }

    /// The stored dataset, if anything was ever stored.
    pub fn snapshot(&self) -> Option<Dataset> {
        self.dataset.lock().unwrap().clone()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    fn load(&self) -> Dataset {
        self.snapshot().unwrap_or_default()
    }

    fn save(&self, dataset: &mut Dataset) -> Result<()> {
        if self.fail_saves {
            bail!("in-memory store configured to reject saves");
        }
        stamp_last_updated(dataset);
        *self.dataset.lock().unwrap() = Some(dataset.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_defaults_to_empty() {
        let store = InMemoryStore::new();
        assert_eq!(store.load(), Dataset::empty());
    }

    #[test]
    fn save_stamps_and_stores() {
        let store = InMemoryStore::new();
        let mut ds = Dataset::empty();
        store.save(&mut ds).unwrap();
        assert!(ds.last_updated.is_some());
        assert_eq!(store.load(), ds);
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn failing_store_keeps_previous_dataset() {
        let mut original = Dataset::empty();
        original.last_updated = Some("2026-02-26T08:00:00Z".to_string());
        let store = InMemoryStore::failing(original.clone());

        let mut next = Dataset::empty();
        next.config.days_to_show = Some(3);
        assert!(store.save(&mut next).is_err());
        assert_eq!(store.load(), original);
        assert_eq!(store.saves(), 0);
    }
}
