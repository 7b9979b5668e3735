use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn feedroll_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("feedroll");
    path
}

const DATA: &str = r#"{
  "lastUpdated": "2026-02-28T06:00:00Z",
  "config": { "daysToShow": 7 },
  "days": [
    {
      "date": "2026-02-28",
      "dailyDigest": "",
      "channels": [
        {
          "channelName": "Fireship",
          "channelUrl": "https://www.youtube.com/@Fireship",
          "videos": [
            {
              "id": "abc123",
              "title": "Something shipped",
              "publishedAt": "2026-02-28T10:00:00+00:00",
              "thumbnailUrl": "https://i.ytimg.com/vi/abc123/hqdefault.jpg",
              "videoUrl": "https://www.youtube.com/watch?v=abc123",
              "summary": "• it shipped",
              "transcriptAvailable": true
            }
          ]
        }
      ]
    }
  ],
  "pipelineStatus": { "status": "partial", "issues": ["RSS unavailable for: Other"] }
}
"#;

fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_path = root.join("public").join("data.json");
    fs::create_dir_all(data_path.parent().unwrap()).unwrap();
    fs::write(&data_path, DATA).unwrap();

    let config_content = format!(
        r#"channels = [
  "https://www.youtube.com/@Fireship",
  "https://www.youtube.com/channel/UCsBjURrPoezykLs9EqgamOA",
]

[data]
path = "{}"

[display]
days_to_show = 7
"#,
        data_path.display()
    );

    let config_path = config_dir.join("feedroll.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path, data_path)
}

fn run_feedroll(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(feedroll_binary())
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run feedroll binary")
}

#[test]
fn test_stats_summarizes_data_file() {
    let (_tmp, config, _data) = setup_test_env();
    let output = run_feedroll(&config, &["stats"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Days:          1"), "{}", stdout);
    assert!(stdout.contains("Videos:        1"), "{}", stdout);
    assert!(stdout.contains("Last run:      partial"), "{}", stdout);
    assert!(stdout.contains("RSS unavailable for: Other"), "{}", stdout);
}

#[test]
fn test_stats_with_data_flag_needs_no_config() {
    let (tmp, _config, data) = setup_test_env();
    let missing = tmp.path().join("nope.toml");
    let output = run_feedroll(&missing, &["stats", "--data", data.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fireship") || stdout.contains("Channels:      1"));
}

#[test]
fn test_stats_on_missing_data_file_reports_empty() {
    let (tmp, config, _data) = setup_test_env();
    let missing = tmp.path().join("missing.json");
    let output = run_feedroll(&config, &["stats", "--data", missing.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Last updated:  never"));
    assert!(stdout.contains("Videos:        0"));
}

#[test]
fn test_changed_never_writes() {
    let (_tmp, config, data) = setup_test_env();
    let before = fs::read_to_string(&data).unwrap();

    let output = run_feedroll(&config, &["changed"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("changed (window 7 days"), "{}", stdout);

    assert_eq!(fs::read_to_string(&data).unwrap(), before);
}

#[test]
fn test_sources_lists_channels_without_network() {
    let (_tmp, config, _data) = setup_test_env();
    let output = run_feedroll(&config, &["sources"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fireship"));
    assert!(stdout.contains("needs lookup"));
    assert!(stdout.contains("UCsBjURrPoezykLs9EqgamOA"));
}

#[test]
fn test_run_with_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run_feedroll(&tmp.path().join("missing.toml"), &["run"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}

#[test]
fn test_invalid_config_fails() {
    let (_tmp, config, _data) = setup_test_env();
    fs::write(&config, "channels = []\n[display]\ndays_to_show = 7\n").unwrap();

    let output = run_feedroll(&config, &["run", "--dry-run"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("channels must be a non-empty list"), "{}", stderr);
}

#[test]
fn test_zero_window_is_rejected() {
    let (_tmp, config, _data) = setup_test_env();
    let content = fs::read_to_string(&config).unwrap();
    fs::write(&config, content.replace("days_to_show = 7", "days_to_show = 0")).unwrap();

    let output = run_feedroll(&config, &["stats"]);
    assert!(!output.status.success());
}

#[test]
fn test_changed_with_huge_window_keeps_every_day() {
    let (_tmp, config, _data) = setup_test_env();
    let content = fs::read_to_string(&config).unwrap();
    fs::write(
        &config,
        content.replace("days_to_show = 7", "days_to_show = 4000000000"),
    )
    .unwrap();

    let output = run_feedroll(&config, &["changed"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("dropped"), "{}", stdout);
}
