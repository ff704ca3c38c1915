use std::process::Command;

fn ishraqa() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ishraqa"))
}

#[test]
fn test_ishraqa_version() {
    let output = ishraqa().arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_ishraqa_help() {
    let output = ishraqa().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("search"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_ishraqa_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ishraqa.toml");

    let output = ishraqa().arg("init").arg(&path).output().unwrap();
    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[backend]"));

    let output = ishraqa().arg("init").arg(&path).output().unwrap();
    assert!(!output.status.success());
}

#[test]
#[ignore] // Requires network access to the live backend
fn test_ishraqa_search_live_backend() {
    let output = ishraqa()
        .args(["search", "villa", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"echoedQuery\": \"villa\""));
}
