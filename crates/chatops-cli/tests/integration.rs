#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn chatops(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chatops").unwrap();
    cmd.current_dir(dir.path()).env("CHATOPS_ROOT", dir.path());
    cmd
}

const CONFIG: &str = r#"
bot:
  name: test-bot
environments: [dev, sit]
directory:
  teams:
    - name: alpha
      channels: [alpha-devs]
      projects: [payments]
    - name: beta
      projects: [ledger, reports]
"#;

fn init_project(dir: &TempDir) {
    std::fs::create_dir_all(dir.path().join(".chatops")).unwrap();
    std::fs::write(dir.path().join(".chatops/config.yaml"), CONFIG).unwrap();
}

fn dispatch_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = chatops(dir)
        .arg("--json")
        .arg("dispatch")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// init / config
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    chatops(&dir)
        .args(["init", "--bot-name", "opsbot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
    assert!(dir.path().join(".chatops/config.yaml").exists());

    chatops(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));
    chatops(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("opsbot"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    chatops(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'beta'").not());

    std::fs::write(
        dir.path().join(".chatops/config.yaml"),
        "gateway:\n  url: ftp://nope\n",
    )
    .unwrap();
    chatops(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_without_init_fails() {
    let dir = TempDir::new().unwrap();
    chatops(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// commands / dispatch / click
// ---------------------------------------------------------------------------

#[test]
fn commands_lists_builtins() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    chatops(&dir)
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("request-environments"))
        .stdout(predicate::str::contains("help"));
}

#[test]
fn dispatch_resolves_from_channel_and_runs_tasks() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    chatops(&dir)
        .args(["dispatch", "request-environments", "--channel", "alpha-devs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Create sit environment"))
        .stdout(predicate::str::contains("2/2 completed"))
        .stdout(predicate::str::contains("completed"));
}

#[test]
fn dispatch_then_click_round_trip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let first = dispatch_json(&dir, &["request-environments", "-p", "teamName=beta"]);
    assert_eq!(first["outcome"]["status"], "prompted");
    assert_eq!(first["outcome"]["parameter"], "projectName");

    let buttons = first["messages"][0]["message"]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|s| s["actions"].as_array().cloned().unwrap_or_default())
        .collect::<Vec<_>>();
    let ledger = buttons.iter().find(|b| b["label"] == "ledger").unwrap();
    let payload = serde_json::to_string(&ledger["invocation"]).unwrap();

    let output = chatops(&dir)
        .args(["--json", "click", &payload])
        .output()
        .unwrap();
    assert!(output.status.success());
    let second: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(second["outcome"]["status"], "completed");
    assert_eq!(second["correlation_id"], first["correlation_id"]);
}

#[test]
fn unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    chatops(&dir)
        .args(["dispatch", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command: nope"));
}

#[test]
fn user_error_is_reported_and_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    chatops(&dir)
        .args(["dispatch", "list-projects", "-p", "teamName=gamma"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("gamma"))
        .stderr(predicate::str::contains("user_input"));
}

#[test]
fn bad_click_payload_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    chatops(&dir)
        .args(["click", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("payload is not a command invocation"));
}
