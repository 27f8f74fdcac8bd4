use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "ski-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_strategies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_ski-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-strategies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available strategies"));
    assert!(content.contains("gunner"));
}

#[test]
fn cli_json_report_covers_every_run() {
    let exe = env!("CARGO_BIN_EXE_ski-tester");
    let output_path = temp_path("json");
    let output = Command::new(exe)
        .args([
            "--strategies",
            "cruiser,jumper",
            "--seeds",
            "1..3",
            "--max-turns",
            "80",
            "--slope-length",
            "40",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(value["runs"].as_array().map(Vec::len), Some(6));
    assert_eq!(value["strategies"].as_array().map(Vec::len), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ski Automated Tester"));
}

#[test]
fn cli_rejects_unknown_strategy() {
    let exe = env!("CARGO_BIN_EXE_ski-tester");
    let output = Command::new(exe)
        .args(["--strategies", "snowplow", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown strategy"));
}

#[test]
fn cli_markdown_script_run() {
    let exe = env!("CARGO_BIN_EXE_ski-tester");
    let output = Command::new(exe)
        .args([
            "--script",
            "r,10,j,h",
            "--seeds",
            "5",
            "--max-turns",
            "50",
            "--report",
            "markdown",
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Ski Run Results"));
    assert!(stdout.contains("| Scripted | 5 |"));
}
