//! End-to-end tests of the `reconcile` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const NOW: &str = "2024-01-01T00:00:00Z";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let ws = Self { dir };

        fs::create_dir_all(ws.downloads()).unwrap();
        fs::write(
            ws.path("reconcile.toml"),
            format!(
                "[scan]\nsearch_locations = [{:?}]\n",
                ws.downloads().display().to_string()
            ),
        )
        .unwrap();

        let library = serde_json::json!({
            "shows": [{"series_id": 1, "folder": ws.show_folder()}]
        });
        fs::write(ws.path("library.json"), library.to_string()).unwrap();

        let episodes: Vec<_> = (1..=3)
            .map(|n| {
                serde_json::json!({
                    "series_id": 1,
                    "episode_id": 10 + n,
                    "aired_season": 1,
                    "aired_number": n,
                    "air_date": format!("2020-01-0{}", n),
                    "name": format!("Episode {}", n),
                })
            })
            .collect();
        let catalog = serde_json::json!({
            "shows": [{"show": {"id": 1, "name": "Foo", "episodes": episodes}}]
        });
        fs::write(ws.path("catalog.json"), catalog.to_string()).unwrap();

        ws.touch(&ws.show_folder().join("Season 01/Foo - S01E01.mkv"));
        ws.touch(&ws.downloads().join("Foo.S01E02.720p.mkv"));
        ws.touch(&ws.downloads().join("Foo.S01E02.720p.srt"));
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn downloads(&self) -> PathBuf {
        self.path("downloads")
    }

    fn show_folder(&self) -> PathBuf {
        self.path("lib").join("Foo")
    }

    fn touch(&self, path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"episode").unwrap();
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_reconcile"));
        cmd.env("RECONCILE_CONFIG", self.path("reconcile.toml"))
            .env("RECONCILE_LIBRARY", self.path("library.json"))
            .env("RECONCILE_CATALOG", self.path("catalog.json"))
            .env("RECONCILE_NOW", NOW)
            .env_remove("RECONCILE_METRICS_FILE");
        cmd
    }

    fn run(&self) -> Output {
        self.command().output().expect("Failed to run reconcile")
    }
}

fn plan_actions(output: &Output) -> Vec<serde_json::Value> {
    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not a JSON plan");
    plan["actions"].as_array().cloned().unwrap_or_default()
}

#[test]
fn test_scan_prints_plan() {
    let ws = Workspace::new();
    let output = ws.run();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let actions = plan_actions(&output);
    let season = ws.show_folder().join("Season 01");

    let moves: Vec<_> = actions
        .iter()
        .filter(|a| a["type"] == "file_operation")
        .collect();
    assert_eq!(moves.len(), 2);
    assert!(moves.iter().all(|a| a["operation"] == "move"));
    let targets: Vec<&str> = moves.iter().filter_map(|a| a["target"].as_str()).collect();
    assert!(targets.contains(&season.join("Foo - S01E02.mkv").to_str().unwrap()));
    assert!(targets.contains(&season.join("Foo - S01E02.srt").to_str().unwrap()));

    let missing: Vec<_> = actions
        .iter()
        .filter(|a| a["type"] == "missing_episode")
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["episode"]["number"], 3);
}

#[test]
fn test_scan_is_deterministic() {
    let ws = Workspace::new();
    let first = ws.run();
    let second = ws.run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_refresh_without_artifacts_is_empty() {
    let ws = Workspace::new();
    let output = ws.command().arg("refresh").output().unwrap();
    assert!(output.status.success());
    assert!(plan_actions(&output).is_empty());
}

#[test]
fn test_metrics_file_written() {
    let ws = Workspace::new();
    let metrics = ws.path("metrics.txt");
    let output = ws
        .command()
        .env("RECONCILE_METRICS_FILE", &metrics)
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = fs::read_to_string(&metrics).unwrap();
    assert!(text.contains("reconcile_planned_actions_total"));
    assert!(text.contains("reconcile_scan_duration_seconds"));
}

#[test]
fn test_missing_config_fails() {
    let ws = Workspace::new();
    let output = ws
        .command()
        .env("RECONCILE_CONFIG", ws.path("absent.toml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unknown_command_fails_with_usage() {
    let ws = Workspace::new();
    let output = ws.command().arg("delete-everything").output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_unknown_refresh_category_fails() {
    let ws = Workspace::new();
    let output = ws.command().args(["refresh", "posters"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("images"));
}

#[test]
fn test_flags_override_environment() {
    let ws = Workspace::new();
    let output = ws
        .command()
        .env("RECONCILE_CONFIG", ws.path("absent.toml"))
        .arg("--config")
        .arg(ws.path("reconcile.toml"))
        .arg("scan")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(plan_actions(&output).len(), 3);
}
