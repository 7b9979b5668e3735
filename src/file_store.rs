//! JSON file store: the single persisted dataset.
//!
//! `load` never fails. A missing, unreadable, or malformed file (including
//! valid JSON without `days`) yields an empty dataset.
//!
//! `save` stamps `lastUpdated`, serializes the whole document first, then
//! writes it to a temporary file next to the target and renames it into
//! place. A crash or error at any point leaves the previous file as it was;
//! on error the temporary file is removed.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use feedroll_core::store::{stamp_last_updated, Store};

use crate::models::Dataset;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn target_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Dataset {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no existing data, starting empty");
                return Dataset::empty();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read data file, starting empty");
                return Dataset::empty();
            }
        };

        match Dataset::from_json(&content) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "data file is malformed, starting empty");
                Dataset::empty()
            }
        }
    }

    fn save(&self, dataset: &mut Dataset) -> Result<()> {
        stamp_last_updated(dataset);
        let json = dataset.to_json_pretty()?;

        let dir = self.target_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

        // Dropping the temp file on any early return deletes it.
        let mut tmp = tempfile::Builder::new()
            .prefix(".feedroll-")
            .suffix(".json")
            .tempfile_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            last_updated = dataset.last_updated.as_deref().unwrap_or_default(),
            "wrote dataset"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelGroup, Day, Video};
    use tempfile::TempDir;

    fn sample() -> Dataset {
        let mut ds = Dataset::empty();
        ds.config.days_to_show = Some(7);
        ds.days.push(Day {
            date: "2026-02-26".to_string(),
            daily_digest: "bullet • point".to_string(),
            channels: vec![ChannelGroup {
                channel_name: "Ch1".to_string(),
                channel_url: "https://www.youtube.com/@Ch1".to_string(),
                videos: vec![Video {
                    id: "v1".to_string(),
                    title: "V1".to_string(),
                    published_at: "2026-02-26T08:00:00+00:00".to_string(),
                    duration: None,
                    thumbnail_url: String::new(),
                    video_url: String::new(),
                    summary: String::new(),
                    transcript_available: false,
                }],
            }],
        });
        ds
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".feedroll-"))
            .count()
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = JsonFileStore::new("/nonexistent/path/data.json");
        let ds = store.load();
        assert!(ds.days.is_empty());
        assert!(ds.last_updated.is_none());
    }

    #[test]
    fn invalid_json_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(&path, "not valid json{{{").unwrap();
        assert_eq!(JsonFileStore::new(&path).load(), Dataset::empty());
    }

    #[test]
    fn json_without_days_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(&path, r#"{"lastUpdated": "2026-02-26T08:00:00Z"}"#).unwrap();
        assert_eq!(JsonFileStore::new(&path).load(), Dataset::empty());
    }

    #[test]
    fn loads_valid_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"lastUpdated": "2026-02-26T08:00:00Z", "config": {}, "days": [{"date": "2026-02-26"}]}"#,
        )
        .unwrap();
        let ds = JsonFileStore::new(&path).load();
        assert_eq!(ds.days.len(), 1);
        assert_eq!(ds.last_updated.as_deref(), Some("2026-02-26T08:00:00Z"));
    }

    #[test]
    fn save_round_trips_and_stamps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("data.json");
        let store = JsonFileStore::new(&path);

        let mut ds = sample();
        store.save(&mut ds).unwrap();

        let stamped = ds.last_updated.clone().unwrap();
        assert!(stamped.ends_with('Z') && stamped.contains('T'));
        assert_eq!(store.load(), ds);
        assert_eq!(leftover_temp_files(path.parent().unwrap()), 0);
    }

    #[test]
    fn preserves_unicode_literally() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        JsonFileStore::new(&path).save(&mut sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains('•'));
        assert!(!content.contains("\\u2022"));
        assert!(content.lines().count() > 1);
    }

    #[test]
    fn failed_replace_leaves_target_and_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory at the target path cannot be replaced by a file.
        let path = tmp.path().join("data.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "original").unwrap();

        let result = JsonFileStore::new(&path).save(&mut sample());
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(path.join("keep")).unwrap(),
            "original"
        );
        assert_eq!(leftover_temp_files(tmp.path()), 0);
    }

    #[test]
    fn overwrite_replaces_previous_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(&path, r#"{"original": true}"#).unwrap();

        let store = JsonFileStore::new(&path);
        store.save(&mut sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("original"));
        assert_eq!(store.load().days.len(), 1);
    }

    #[test]
    fn unfamiliar_status_and_keys_keep_history() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
  "lastUpdated": "2026-02-26T08:00:00Z",
  "config": {"daysToShow": 7},
  "pipelineStatus": {"status": "error", "issues": ["upstream down"]},
  "siteTitle": "AI news",
  "days": [{"date": "2026-02-26", "channels": [
    {"channelName": "Ch1", "videos": [{"id": "v1"}]}
  ]}]
}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path);
        let mut ds = store.load();
        assert_eq!(ds.days.len(), 1);
        assert_eq!(ds.video_count(), 1);
        assert_eq!(
            ds.pipeline_status.as_ref().map(|s| s.status.as_str()),
            Some("error")
        );

        store.save(&mut ds).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"siteTitle\": \"AI news\""));
        assert!(content.contains("\"status\": \"error\""));
        assert_eq!(store.load().video_count(), 1);
    }
}
