use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "architect-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_architect-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    for key in ["steady", "burst", "grind", "repeat", "gap", "marathon"] {
        assert!(content.contains(key), "missing {key}");
    }
}

#[test]
fn cli_writes_json_report_for_passing_runs() {
    let exe = env!("CARGO_BIN_EXE_architect-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "steady,repeat",
            "--seeds",
            "1,2",
            "--days",
            "8",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Life Architect Progression Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("parse json");
    assert_eq!(report["failed"], 0);
    assert_eq!(report["results"].as_array().map(Vec::len), Some(4));
}

#[test]
fn cli_rejects_invalid_config() {
    let exe = env!("CARGO_BIN_EXE_architect-tester");
    let config_path = temp_path("config");
    std::fs::write(&config_path, r#"{"tiers": {"full_threshold": 20, "half_threshold": 5}}"#)
        .expect("write config");
    let output = Command::new(exe)
        .args(["--scenarios", "steady", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid reward configuration"));
}
