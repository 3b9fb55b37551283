//! Integration tests for the `bw` CLI.
//!
//! Each test creates a temp vault, runs `bw` as a subprocess, and verifies
//! stdout and/or note contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `bw` binary.
fn bw_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("bw");
    path
}

/// Create a small vault: two notes, one in a subfolder, and no config.
fn create_test_vault(root: &Path) {
    fs::create_dir_all(root.join("work")).unwrap();
    fs::create_dir_all(root.join(".obsidian")).unwrap();

    fs::write(
        root.join("Shopping.md"),
        "\
# Shopping

- [ ] Buy milk #errand
- [x] Buy bread #errand ✅ 2025-05-02
Some prose mentioning Buy milk.
",
    )
    .unwrap();

    fs::write(
        root.join("work/Site.md"),
        "\
# Site relaunch

- [/] Draft copy ⏫ 📅 2025-06-01
- [ ] Pick fonts 🔽
- [-] Old banner idea

```
- [ ] not a task, inside a fence
```
",
    )
    .unwrap();

    fs::write(root.join(".obsidian/ignored.md"), "- [ ] Hidden task\n").unwrap();
}

/// Run `bw` with the given args in the given directory, returning (stdout, stderr, success).
fn run_bw(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(bw_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("BOARDWALK_LOG")
        .output()
        .expect("failed to run bw");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `bw` expecting success, return stdout.
fn run_bw_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_bw(dir, args);
    if !success {
        panic!(
            "bw {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Look up a task id by description through `bw tasks --json`.
fn task_id(dir: &Path, description: &str) -> String {
    let out = run_bw_ok(dir, &["tasks", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    parsed
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["description"] == description)
        .unwrap_or_else(|| panic!("no task '{}' in {}", description, out))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_board_default_columns() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_bw_ok(tmp.path(), &["board"]);
    let headers: Vec<&str> = out.lines().filter(|l| !l.starts_with(' ')).collect();
    assert_eq!(
        headers,
        vec!["Todo (2)", "In-Progress (1)", "Done (1)", "Cancelled (1)"]
    );
    assert!(out.contains("Buy milk"));
    assert!(!out.contains("Hidden task"));
    assert!(!out.contains("inside a fence"));
}

#[test]
fn test_board_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_bw_ok(tmp.path(), &["board", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        parsed["columns"],
        serde_json::json!(["Todo", "In-Progress", "Done", "Cancelled"])
    );
    let todo = &parsed["cells"][0]["tasks"];
    assert_eq!(todo.as_array().unwrap().len(), 2);
    assert_eq!(todo[0]["path"], "Shopping.md");
    assert_eq!(todo[0]["line"], 3);
}

#[test]
fn test_board_priority_columns_are_complete() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_bw_ok(tmp.path(), &["board", "--group-by", "priority", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        parsed["columns"],
        serde_json::json!(["Highest", "High", "Medium", "Low", "Lowest", "None"])
    );
}

#[test]
fn test_board_lanes() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_bw_ok(tmp.path(), &["board", "--lanes-by", "folder", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let lanes = parsed["lanes"].as_array().unwrap();
    let names: Vec<&str> = lanes.iter().map(|l| l["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["/", "work"]);
    for lane in lanes {
        let keys: Vec<&str> = lane["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["Todo", "In-Progress", "Done", "Cancelled"]);
    }
}

#[test]
fn test_board_unknown_field_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let (_, stderr, success) = run_bw(tmp.path(), &["board", "--group-by", "mood"]);
    assert!(!success);
    assert!(stderr.contains("unknown group field 'mood'"));
}

#[test]
fn test_tasks_listing() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_bw_ok(tmp.path(), &["tasks"]);
    assert_eq!(out.lines().count(), 5);
    assert!(out.contains("Shopping.md:3"));
    assert!(out.contains("[/]"));
}

#[test]
fn test_statuses_fallback_table() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_bw_ok(tmp.path(), &["statuses"]);
    assert_eq!(
        out,
        "[ ] Todo (TODO)\n[/] In-Progress (IN_PROGRESS)\n[x] Done (DONE)\n[-] Cancelled (CANCELLED)\n"
    );
}

#[test]
fn test_vault_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    let elsewhere = tempfile::TempDir::new().unwrap();

    let out = run_bw_ok(
        elsewhere.path(),
        &["-C", tmp.path().to_str().unwrap(), "board"],
    );
    assert!(out.contains("Buy milk"));
}

// ---------------------------------------------------------------------------
// Move tests
// ---------------------------------------------------------------------------

#[test]
fn test_move_to_done_rewrites_one_character() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    let before = fs::read_to_string(tmp.path().join("Shopping.md")).unwrap();

    let id = task_id(tmp.path(), "Buy milk #errand");
    let out = run_bw_ok(tmp.path(), &["move", &id[..8], "Done"]);
    assert!(out.contains("-> Done"));

    let after = fs::read_to_string(tmp.path().join("Shopping.md")).unwrap();
    assert_eq!(after, before.replacen("- [ ] Buy milk", "- [x] Buy milk", 1));
}

#[test]
fn test_move_same_column_leaves_file_alone() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    let before = fs::read_to_string(tmp.path().join("work/Site.md")).unwrap();

    let id = task_id(tmp.path(), "Draft copy");
    let out = run_bw_ok(tmp.path(), &["move", &id, "In-Progress"]);
    assert!(out.contains("already in In-Progress"));
    assert_eq!(fs::read_to_string(tmp.path().join("work/Site.md")).unwrap(), before);
}

#[test]
fn test_move_json_outcome() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let id = task_id(tmp.path(), "Pick fonts");
    let out = run_bw_ok(tmp.path(), &["move", &id, "Cancelled", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["outcome"], "written");
    assert_eq!(parsed["line"], 4);
    assert!(
        fs::read_to_string(tmp.path().join("work/Site.md"))
            .unwrap()
            .contains("- [-] Pick fonts 🔽")
    );
}

#[test]
fn test_move_unknown_column_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    let before = fs::read_to_string(tmp.path().join("Shopping.md")).unwrap();

    let id = task_id(tmp.path(), "Buy milk #errand");
    let (_, stderr, success) = run_bw(tmp.path(), &["move", &id, "Backlog"]);
    assert!(!success);
    assert!(stderr.contains("no status marker for column 'Backlog'"));
    assert_eq!(fs::read_to_string(tmp.path().join("Shopping.md")).unwrap(), before);
}

#[test]
fn test_move_unknown_task_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let (_, stderr, success) = run_bw(tmp.path(), &["move", "zzzz", "Done"]);
    assert!(!success);
    assert!(stderr.contains("task not on the board: zzzz"));
}

#[test]
fn test_move_with_custom_statuses() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    fs::write(
        tmp.path().join("boardwalk.toml"),
        r#"[board]
group_by = "status.name"

[[statuses]]
marker = " "
name = "Backlog"
type = "TODO"

[[statuses]]
marker = ">"
name = "Waiting"
type = "TODO"

[[statuses]]
marker = "x"
name = "Shipped"
type = "DONE"
"#,
    )
    .unwrap();

    let id = task_id(tmp.path(), "Buy milk #errand");
    run_bw_ok(tmp.path(), &["move", &id, "Waiting"]);
    let text = fs::read_to_string(tmp.path().join("Shopping.md")).unwrap();
    assert!(text.contains("- [>] Buy milk #errand"));

    let out = run_bw_ok(tmp.path(), &["board", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    // configured names rank by type; unconfigured markers keep their labels
    assert_eq!(
        parsed["columns"],
        serde_json::json!(["Backlog", "Waiting", "In-Progress", "Shipped", "Cancelled"])
    );
    assert_eq!(parsed["cells"][1]["tasks"][0]["description"], "Buy milk #errand");
}

// ---------------------------------------------------------------------------
// Config command tests
// ---------------------------------------------------------------------------

#[test]
fn test_init_then_order_set_and_reset() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    run_bw_ok(tmp.path(), &["init"]);
    let (_, stderr, success) = run_bw(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));

    run_bw_ok(tmp.path(), &["order", "set", "Done", "Todo"]);
    let config = fs::read_to_string(tmp.path().join("boardwalk.toml")).unwrap();
    assert!(config.contains(r#"column_order = ["Done", "Todo"]"#));
    // comments from the template survive the edit
    assert!(config.contains("# Column dimension"));

    let out = run_bw_ok(tmp.path(), &["order", "show"]);
    assert_eq!(out, "Done\nTodo\nIn-Progress\nCancelled\n");

    run_bw_ok(tmp.path(), &["order", "reset"]);
    let out = run_bw_ok(tmp.path(), &["order", "show"]);
    assert_eq!(out, "Todo\nIn-Progress\nDone\nCancelled\n");
}

#[test]
fn test_config_discovered_from_subdirectory() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    fs::write(
        tmp.path().join("boardwalk.toml"),
        "[filter]\ninclude_done = false\n",
    )
    .unwrap();

    let out = run_bw_ok(&tmp.path().join("work"), &["tasks", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    // whole vault, minus the done and cancelled tasks
    assert_eq!(parsed.as_array().unwrap().len(), 3);
}
