//! CLI integration tests

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "captured_at": "2026-03-01T12:00:00Z",
    "nodes": [
        {"name": "worker-1", "CPU": 4, "Memory": "8G"},
        {"name": "worker-2", "CPU": 4, "Memory": "8G"}
    ],
    "quota": {"cpu_limit": "4", "cpu_used": "1"},
    "form": {
        "name": "web",
        "replicas": 2,
        "cpu_limit": 0.5,
        "memory_limit_mb": 256,
        "environment_variables": [{"name": "PORT", "value": "8080"}],
        "persisted_folders": [
            {"container_path": "/data", "storage_class": {"name": "local-path", "access_modes": ["RWO"]}}
        ]
    },
    "existing_applications": [{"id": "uid-1", "name": "api"}],
    "pods": [
        {
            "metadata": {"name": "api-0"},
            "spec": {
                "nodeName": "worker-1",
                "containers": [{"name": "api", "resources": {"requests": {"cpu": "500m", "memory": "256M"}}}]
            }
        }
    ]
}"#;

/// Run the binary with an isolated home directory and no `KRES_*` overrides
fn kres(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kres"))
        .args(args)
        .env("HOME", home)
        .env_remove("KRES_SNAPSHOT_URL")
        .env_remove("KRES_CPU_FLOOR")
        .env_remove("KRES_MEMORY_FLOOR_MB")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn write_snapshot(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, content).expect("Failed to write snapshot");
    path.to_string_lossy().into_owned()
}

fn json_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = kres(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("headroom"), "Should show headroom command");
    assert!(stdout.contains("compat"), "Should show compat command");
    assert!(stdout.contains("validate"), "Should show validate command");
    assert!(stdout.contains("cluster"), "Should show cluster command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = kres(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kres"), "Should show binary name");
}

/// Test that a snapshot source is required
#[test]
fn test_missing_snapshot_fails() {
    let home = TempDir::new().unwrap();
    let output = kres(home.path(), &["headroom"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("--snapshot"), "Should explain how to pass a snapshot");
}

/// Test headroom under a CPU-only quota
#[test]
fn test_headroom_json() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["headroom", "--snapshot", &path, "--format", "json"]);

    assert!(output.status.success(), "Headroom should succeed");
    let report = json_stdout(&output);
    assert_eq!(report["headroom"]["cpu"]["min"], 0.1);
    assert_eq!(report["headroom"]["cpu"]["max"], 3.0);
    assert_eq!(report["headroom"]["memory_mb"]["max"], 16_000);
    assert_eq!(report["exceeds_headroom"], false);
}

/// Test the table rendering of the headroom command
#[test]
fn test_headroom_table() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["headroom", "--snapshot", &path]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("CPU (cores)"));
    assert!(stdout.contains("Namespace quota applied"));
}

/// Test compatibility answers for RWO-only storage
#[test]
fn test_compat_json() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["compat", "--snapshot", &path, "--format", "json"]);

    assert!(output.status.success(), "Compat should succeed");
    let report = json_stdout(&output);
    assert_eq!(report["supports_global_deployment"], false);
    assert_eq!(report["supports_scalable_replicas"], false);
    assert_eq!(report["non_scalable_storage_classes"][0], "local-path");
}

/// Test that a valid form passes validation
#[test]
fn test_validate_ready() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["validate", "--snapshot", &path]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Validation should pass");
    assert!(stdout.contains("Ready to deploy"));
    assert!(
        stdout.contains("cannot be shared by several replicas"),
        "Should warn about replicas on ReadWriteOnce-only storage"
    );
}

/// Test the replica warning in JSON output
#[test]
fn test_validate_replicas_on_exclusive_storage() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["validate", "--snapshot", &path, "--format", "json"]);

    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["replicas_exceed_storage"], true);

    let mut snapshot: Value = serde_json::from_str(SNAPSHOT).unwrap();
    snapshot["form"]["data_access_policy"] = "ISOLATED".into();
    let path = write_snapshot(&dir, &snapshot.to_string());
    let output = kres(dir.path(), &["validate", "--snapshot", &path, "--format", "json"]);

    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["replicas_exceed_storage"], false);
}

/// Test that duplicates and name conflicts fail validation
#[test]
fn test_validate_blocked() {
    let mut snapshot: Value = serde_json::from_str(SNAPSHOT).unwrap();
    snapshot["form"]["name"] = "api".into();
    snapshot["form"]["environment_variables"] = serde_json::json!([
        {"name": "PORT", "value": "80"},
        {"name": "PORT", "value": "81"}
    ]);

    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, &snapshot.to_string());
    let output = kres(dir.path(), &["validate", "--snapshot", &path, "--format", "json"]);

    assert!(!output.status.success(), "Validation should fail");
    let report = json_stdout(&output);
    assert_eq!(report["deploy_disabled"], true);

    let reasons = report["blocking_reasons"].as_array().unwrap();
    assert!(reasons.contains(&Value::from("duplicate_environment_variables")));
    assert!(reasons.contains(&Value::from("name_conflict")));
    assert_eq!(report["readiness"]["duplicate_environment_variables"]["PORT"], 2);
}

/// Test that duplicate configuration keys fail validation
#[test]
fn test_validate_configuration_keys() {
    let mut snapshot: Value = serde_json::from_str(SNAPSHOT).unwrap();
    snapshot["configuration"] = serde_json::json!({
        "entries": [{"key": "app.conf"}, {"key": "app.conf"}]
    });

    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, &snapshot.to_string());
    let output = kres(dir.path(), &["validate", "--snapshot", &path]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.contains("app.conf"));
    assert!(
        stderr.contains("configuration keys are duplicated"),
        "Errors should go to stderr"
    );
    assert!(!stdout.contains("configuration keys are duplicated"));
}

/// Test cluster capacity against scheduled pods
#[test]
fn test_cluster_json() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["cluster", "--snapshot", &path, "--format", "json"]);

    assert!(output.status.success(), "Cluster should succeed");
    let report = json_stdout(&output);
    assert_eq!(report["node_count"], 2);
    assert_eq!(report["cpu_capacity"], 8.0);
    assert_eq!(report["cpu_reserved"], 0.5);
    assert_eq!(report["memory_reserved_mb"], 256);
}

/// Test that malformed snapshots are rejected
#[test]
fn test_malformed_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, r#"{"nodes": [{"name": "a", "cpu": 1, "memory": "lots"}]}"#);
    let output = kres(dir.path(), &["headroom", "--snapshot", &path]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Invalid node listing"));
}

/// Test that config file floors reach the evaluator
#[test]
fn test_config_file_floors() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join(".config").join("kres");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "cpu_floor = 0.5\n").unwrap();

    let path = write_snapshot(&dir, SNAPSHOT);
    let output = kres(dir.path(), &["headroom", "--snapshot", &path, "--format", "json"]);

    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["headroom"]["cpu"]["min"], 0.5);
}
