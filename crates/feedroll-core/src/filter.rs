//! Incremental filter: restrict freshly fetched videos to the ones the
//! dataset has not seen yet.

use std::collections::HashSet;

use crate::models::{Dataset, SourceVideo};

/// Every video id present anywhere in the dataset.
pub fn existing_video_ids(dataset: &Dataset) -> HashSet<String> {
    dataset.videos().map(|v| v.id.clone()).collect()
}

/// Videos whose id is not in `existing`, in input order.
pub fn filter_new_videos(
    all_videos: Vec<SourceVideo>,
    existing: &HashSet<String>,
) -> Vec<SourceVideo> {
    all_videos
        .into_iter()
        .filter(|v| !existing.contains(v.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelGroup, Day, Video};

    fn video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: format!("Video {}", id),
            published_at: "2026-02-26T08:00:00+00:00".to_string(),
            duration: None,
            thumbnail_url: String::new(),
            video_url: String::new(),
            summary: String::new(),
            transcript_available: false,
        }
    }

    fn source(id: &str) -> SourceVideo {
        SourceVideo {
            video: video(id),
            channel_name: Some("Ch".to_string()),
            channel_url: "https://www.youtube.com/@Ch".to_string(),
        }
    }

    #[test]
    fn extracts_ids_across_days_and_channels() {
        let mut ds = Dataset::empty();
        ds.days.push(Day {
            date: "2026-02-26".to_string(),
            daily_digest: String::new(),
            channels: vec![
                ChannelGroup {
                    channel_name: "Ch1".to_string(),
                    channel_url: String::new(),
                    videos: vec![video("a"), video("b")],
                },
                ChannelGroup {
                    channel_name: "Ch2".to_string(),
                    channel_url: String::new(),
                    videos: vec![video("c")],
                },
            ],
        });
        let ids = existing_video_ids(&ds);
        let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn empty_dataset_has_no_ids() {
        assert!(existing_video_ids(&Dataset::empty()).is_empty());
    }

    #[test]
    fn filters_known_ids_preserving_order() {
        let existing: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let result = filter_new_videos(vec![source("a"), source("b"), source("c")], &existing);
        let ids: Vec<&str> = result.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn keeps_everything_when_nothing_known() {
        let result = filter_new_videos(
            vec![source("z"), source("y"), source("x")],
            &HashSet::new(),
        );
        let ids: Vec<&str> = result.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }
}
