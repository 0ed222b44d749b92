//! Integration tests for the `sol` CLI.
//!
//! Each test works in a temp directory with its own HOME and config dir,
//! runs `sol` as a subprocess, and checks stdout and/or file contents.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the built `sol` binary.
fn sol_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("sol");
    path
}

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Env {
            dir: TempDir::new().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn todo(&self) -> PathBuf {
        self.root().join("todo.txt")
    }

    fn write_todo(&self, content: &str) {
        fs::write(self.todo(), content).unwrap();
    }

    fn read_todo(&self) -> String {
        fs::read_to_string(self.todo()).unwrap_or_default()
    }

    fn write_config(&self, content: &str) {
        let dir = self.root().join("config/sol");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), content).unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(sol_bin())
            .arg("--file")
            .arg(self.todo())
            .args(args)
            .current_dir(self.root())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run sol")
    }

    /// Run and return stdout, panicking on failure.
    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "sol {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    /// Run expecting failure and return stderr.
    fn fail(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(!output.status.success(), "sol {:?} should have failed", args);
        String::from_utf8(output.stderr).unwrap()
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[test]
fn list_numbers_tasks_from_one() {
    let env = Env::new();
    env.write_todo("(A) Call mom @phone\nBuy milk @store\n");

    assert_eq!(
        env.ok(&["list"]),
        "1: (A) Call mom @phone\n2: Buy milk @store\n"
    );
    // No subcommand lists too
    assert_eq!(env.ok(&[]), env.ok(&["list"]));
}

#[test]
fn list_terms_include_and_exclude() {
    let env = Env::new();
    env.write_todo("Call mom @phone\nBuy milk @store\nBuy bread @store\n");

    assert_eq!(env.ok(&["list", "Buy"]), "2: Buy milk @store\n3: Buy bread @store\n");
    assert_eq!(env.ok(&["list", "Buy", "/milk"]), "3: Buy bread @store\n");
    assert_eq!(
        env.ok(&["list", "mom/bread"]),
        "1: Call mom @phone\n3: Buy bread @store\n"
    );
}

#[test]
fn list_pads_numbers() {
    let env = Env::new();
    let content: String = (1..=10).map(|i| format!("task {}\n", i)).collect();
    env.write_todo(&content);

    let out = env.ok(&["list"]);
    assert!(out.starts_with("01: task 1\n"));
    assert!(out.ends_with("10: task 10\n"));
}

#[test]
fn missing_file_lists_nothing() {
    let env = Env::new();
    assert_eq!(env.ok(&["list"]), "");
    assert!(!env.todo().exists());
}

#[test]
fn done_lists_completed_only() {
    let env = Env::new();
    env.write_todo("open one\nx closed one\n");
    assert_eq!(env.ok(&["done"]), "2: x closed one\n");
}

#[test]
fn search_by_field() {
    let env = Env::new();
    env.write_todo("(A) Call mom @phone +family\n(B) Email boss @work due:friday\nCall plumber @phone\n");

    assert_eq!(
        env.ok(&["search", "phone", "--by", "context"]),
        "1: (A) Call mom @phone +family\n3: Call plumber @phone\n"
    );
    assert_eq!(
        env.ok(&["search", "B", "--by", "priority"]),
        "2: (B) Email boss @work due:friday\n"
    );
    assert_eq!(env.ok(&["search", "call"]).lines().count(), 2);
    assert_eq!(env.ok(&["search", "call", "--case-sensitive"]), "");
    assert_eq!(
        env.ok(&["search", "due:friday", "--by", "keyword"]),
        "2: (B) Email boss @work due:friday\n"
    );
}

#[test]
fn contexts_and_projects_are_sorted_and_unique() {
    let env = Env::new();
    env.write_todo("a @work +b\nb @home +a\nc @work\n");

    assert_eq!(env.ok(&["contexts"]), "home\nwork\n");
    assert_eq!(env.ok(&["projects"]), "a\nb\n");
}

#[test]
fn json_list_has_task_fields() {
    let env = Env::new();
    env.write_todo("(A) 2024-01-01 Call mom @phone +family due:today\n");

    let out = env.ok(&["--json", "list"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let task = &value[0];
    assert_eq!(task["index"], 1);
    assert_eq!(task["line"], "(A) 2024-01-01 Call mom @phone +family due:today");
    assert_eq!(task["complete"], false);
    assert_eq!(task["priority"], "A");
    assert_eq!(task["created"], "2024-01-01");
    assert_eq!(task["message"], "Call mom @phone +family due:today");
    assert_eq!(task["contexts"][0], "phone");
    assert_eq!(task["projects"][0], "family");
    assert_eq!(task["keywords"]["due"], "today");
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

#[test]
fn add_appends_and_creates_file() {
    let env = Env::new();
    assert_eq!(env.ok(&["add", "(B)", "Write", "report"]), "1: (B) Write report\n");
    assert_eq!(env.ok(&["add", "Second task"]), "2: Second task\n");
    assert_eq!(env.read_todo(), "(B) Write report\nSecond task\n");
}

#[test]
fn add_with_date_and_index() {
    let env = Env::new();
    env.write_todo("first\nsecond\n");

    env.ok(&["add", "--date", "--index", "2", "middle"]);
    assert_eq!(
        env.read_todo(),
        format!("first\n{} middle\nsecond\n", today())
    );

    let err = env.fail(&["add", "--index", "9", "nowhere"]);
    assert!(err.starts_with("error:"), "{}", err);
}

#[test]
fn add_with_date_on_completed_task() {
    let env = Env::new();
    let today = today();

    assert_eq!(
        env.ok(&["add", "--date", "x Buy milk"]),
        format!("1: x {today} {today} Buy milk\n")
    );
    // An explicit completion date is kept
    env.ok(&["add", "--date", "x 2024-01-02 Pay rent"]);
    assert_eq!(
        env.read_todo(),
        format!("x {today} {today} Buy milk\nx 2024-01-02 {today} Pay rent\n")
    );
}

#[test]
fn add_equal_task_does_not_duplicate() {
    let env = Env::new();
    env.write_todo("same task\nother\n");
    assert_eq!(env.ok(&["add", "same task"]), "1: same task\n");
    assert_eq!(env.read_todo(), "same task\nother\n");
}

#[test]
fn add_rejects_invalid_dates() {
    let env = Env::new();
    let err = env.fail(&["add", "2024-02-30 leap day"]);
    assert!(err.starts_with("error:"), "{}", err);
    assert!(!env.todo().exists());
}

#[test]
fn check_uncheck_toggle() {
    let env = Env::new();
    env.write_todo("(A) 2024-01-01 Ship it\n");

    env.ok(&["check", "1"]);
    assert_eq!(
        env.read_todo(),
        format!("x (A) {} 2024-01-01 Ship it\n", today())
    );

    env.ok(&["uncheck", "1"]);
    assert_eq!(env.read_todo(), "(A) 2024-01-01 Ship it\n");

    env.ok(&["toggle", "1"]);
    assert!(env.read_todo().starts_with("x (A) "));
    env.ok(&["toggle", "1"]);
    assert_eq!(env.read_todo(), "(A) 2024-01-01 Ship it\n");
}

#[test]
fn check_and_depri_take_several_numbers() {
    let env = Env::new();
    env.write_todo("(A) one\n(B) two\n(C) three\n");

    env.ok(&["depri", "1", "3"]);
    assert_eq!(env.read_todo(), "one\n(B) two\nthree\n");

    env.ok(&["do", "3", "1"]);
    let content = env.read_todo();
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[0].starts_with("x ") && lines[0].ends_with(" one"));
    assert_eq!(lines[1], "(B) two");
    assert!(lines[2].starts_with("x ") && lines[2].ends_with(" three"));
}

#[test]
fn bad_number_in_a_batch_changes_nothing() {
    let env = Env::new();
    env.write_todo("one\ntwo\n");

    let err = env.fail(&["check", "1", "7"]);
    assert!(err.contains("no task 7"), "{}", err);
    let err = env.fail(&["rm", "2", "0"]);
    assert!(err.contains("no task 0"), "{}", err);
    assert_eq!(env.read_todo(), "one\ntwo\n");
}

#[test]
fn keep_sorted_reports_new_position() {
    let env = Env::new();
    env.write_config("keep_sorted = true\n");
    env.write_todo("(A) first\n(B) second\n");

    let out = env.ok(&["check", "1"]);
    assert!(out.starts_with("2: x "), "{}", out);
    assert!(env.read_todo().starts_with("(B) second\nx "));
}

#[test]
fn listpri_filters_by_letter_class() {
    let env = Env::new();
    env.write_todo("(A) call @phone\n(C) read\nplain\n(B) email @phone\n");

    assert_eq!(
        env.ok(&["listpri"]),
        "1: (A) call @phone\n2: (C) read\n4: (B) email @phone\n"
    );
    assert_eq!(
        env.ok(&["lsp", "a-b"]),
        "1: (A) call @phone\n4: (B) email @phone\n"
    );
    assert_eq!(env.ok(&["listpri", "AC", "/phone"]), "2: (C) read\n");

    let err = env.fail(&["listpri", "1-2"]);
    assert!(err.starts_with("error:"), "{}", err);
}

#[test]
fn priorities() {
    let env = Env::new();
    env.write_todo("Plan week\n");

    env.ok(&["pri", "1", "c"]);
    assert_eq!(env.read_todo(), "(C) Plan week\n");
    env.ok(&["depri", "1"]);
    assert_eq!(env.read_todo(), "Plan week\n");

    let err = env.fail(&["pri", "1", "7"]);
    assert!(err.starts_with("error:"), "{}", err);
    assert_eq!(env.read_todo(), "Plan week\n");
}

#[test]
fn edit_text() {
    let env = Env::new();
    env.write_todo("(A) Call mom\n");

    env.ok(&["append", "1", "@phone"]);
    assert_eq!(env.read_todo(), "(A) Call mom @phone\n");
    env.ok(&["prepend", "1", "Please"]);
    assert_eq!(env.read_todo(), "(A) Please Call mom @phone\n");
    env.ok(&["replace", "1", "(B)", "Call dad"]);
    assert_eq!(env.read_todo(), "(B) Call dad\n");
}

#[test]
fn rm_and_out_of_range() {
    let env = Env::new();
    env.write_todo("one\ntwo\nthree\n");

    assert_eq!(env.ok(&["rm", "2"]), "Removed 2: two\n");
    assert_eq!(env.read_todo(), "one\nthree\n");

    for args in [["rm", "0"], ["rm", "3"], ["check", "5"]] {
        let err = env.fail(&args);
        assert!(err.contains("no task"), "{}", err);
    }
    assert_eq!(env.read_todo(), "one\nthree\n");
}

#[test]
fn rm_several_numbers() {
    let env = Env::new();
    env.write_todo("one\ntwo\nthree\nfour\n");

    assert_eq!(
        env.ok(&["rm", "3", "1", "3"]),
        "Removed 1: one\nRemoved 3: three\n"
    );
    assert_eq!(env.read_todo(), "two\nfour\n");
}

#[test]
fn sort_and_dedup() {
    let env = Env::new();
    env.write_todo("x done\nzebra\n(A) urgent\nzebra\n");

    assert_eq!(env.ok(&["dedup"]), "Removed 1 duplicate task(s)\n");
    assert_eq!(env.read_todo(), "x done\nzebra\n(A) urgent\n");

    env.ok(&["sort"]);
    assert_eq!(env.read_todo(), "(A) urgent\nzebra\nx done\n");
    assert_eq!(env.ok(&["sort"]), "Already sorted\n");
}

#[test]
fn keep_sorted_from_config() {
    let env = Env::new();
    env.write_config("keep_sorted = true\n");
    env.write_todo("(B) second\n");

    assert_eq!(env.ok(&["add", "(A)", "first"]), "1: (A) first\n");
    assert_eq!(env.read_todo(), "(A) first\n(B) second\n");
}

#[test]
fn unknown_config_key_is_an_error() {
    let env = Env::new();
    env.write_config("not_a_key = 1\n");
    let err = env.fail(&["list"]);
    assert!(err.starts_with("error:"), "{}", err);
}

#[test]
fn read_commands_leave_file_untouched() {
    let env = Env::new();
    // Non-canonical spacing would be normalized by a rewrite
    env.write_todo("(A)  spaced   out\n");
    env.ok(&["list"]);
    env.ok(&["search", "spaced"]);
    assert_eq!(env.read_todo(), "(A)  spaced   out\n");
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

fn write_tree(root: &Path) {
    let src = root.join("proj/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(root.join("proj/Cargo.toml"), "[package]\n").unwrap();
    fs::write(src.join("lib.rs"), "// FIXME: broken\nfn f() {}\n// TODO\n").unwrap();
}

#[test]
fn scan_prints_tasks_footer_and_soft_errors() {
    let env = Env::new();
    write_tree(env.root());

    let output = env.run(&["scan", "proj"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "(A) c:FIXME +src @lib.rs ln:001 : broken");
    assert!(lines[1].starts_with("footer:time Generated "));
    assert!(lines[1].ends_with("profile:rust"));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unable to parse 1 comment line(s):"), "{}", stderr);
    assert!(stderr.contains("lib.rs: 3"), "{}", stderr);
}

#[test]
fn scan_with_named_profile() {
    let env = Env::new();
    write_tree(env.root());

    let out = env.ok(&["scan", "proj", "--profile", "default"]);
    assert!(out.trim_end().ends_with("profile:default"));

    let err = env.fail(&["scan", "proj", "--profile", "cobol"]);
    assert!(err.contains("unknown profile"), "{}", err);
}

#[test]
fn scan_into_merges_without_duplicates() {
    let env = Env::new();
    write_tree(env.root());
    let into = env.root().join("scanned.txt");
    let into_arg = into.to_str().unwrap();

    env.ok(&["scan", "proj", "--into", into_arg]);
    env.ok(&["scan", "proj", "--into", into_arg]);
    assert_eq!(
        fs::read_to_string(&into).unwrap(),
        "(A) c:FIXME +src @lib.rs ln:001 : broken\n"
    );
}

#[test]
fn scan_missing_root_fails() {
    let env = Env::new();
    let err = env.fail(&["scan", "does-not-exist"]);
    assert!(err.starts_with("error:"), "{}", err);
}
