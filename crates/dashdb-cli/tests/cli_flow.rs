use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dashdb"))
}

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("config")).expect("create config dir");
        Self { dir }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn config_home(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn write_config(&self, contents: &str) {
        let path = self.config_home().join("dashdb").join("config.toml");
        std::fs::create_dir_all(path.parent().expect("config parent")).expect("create dir");
        std::fs::write(path, contents).expect("write config");
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(bin())
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.dir.path().join("xdg-data"))
            .env("DASHDB_DATA_DIR", self.data_dir())
            .env_remove("DASHDB_CONFIG")
            .env_remove("DASHDB_LOG")
            .output()
            .expect("run dashdb")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "dashdb {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf8 stdout")
    }
}

fn json_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("line should be JSON"))
        .collect()
}

fn file_lines(path: &Path) -> Vec<Value> {
    json_lines(&std::fs::read_to_string(path).expect("read collection file"))
}

#[test]
fn test_append_list_update_delete_flow() {
    let env = Env::new();

    let created = json_lines(&env.run_ok(&[
        "append",
        "items",
        r#"{"name":"Foo"}"#,
        r#"{"name":"Baz"}"#,
    ]));
    assert_eq!(created.len(), 2);
    let id = created[0]["id"].as_str().expect("id").to_string();
    assert_eq!(id.len(), 32);
    assert_eq!(created[0]["created"], created[0]["modified"]);

    let listed = json_lines(&env.run_ok(&["list", "items"]));
    assert_eq!(listed, created);

    let out = env.run_ok(&[
        "update",
        "items",
        "--where",
        r#"{"name":"Foo"}"#,
        "--set",
        r#"{"name":"Bar"}"#,
    ]);
    assert!(out.contains("Updated 1 record(s)"));

    let bars = json_lines(&env.run_ok(&["where", "items", r#"{"name":"Bar"}"#]));
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0]["id"], Value::String(id.clone()));
    assert_eq!(bars[0]["created"], created[0]["created"]);
    assert_ne!(bars[0]["hash"], created[0]["hash"]);

    let got = json_lines(&env.run_ok(&["get", "items", &id]));
    assert_eq!(got, bars);

    let out = env.run_ok(&["delete", "items", "--where", r#"{"name":"Bar"}"#]);
    assert!(out.contains("Deleted 1 record(s)"));

    let remaining = file_lines(&env.data_dir().join("items.json"));
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["name"], "Baz");
}

#[test]
fn test_path_prints_backing_file() {
    let env = Env::new();
    let out = env.run_ok(&["path", "items"]);
    let expected = env.data_dir().join("items.json");
    assert_eq!(out.trim(), expected.to_string_lossy());
    assert!(expected.is_file());
}

#[test]
fn test_rejects_non_object_json() {
    let env = Env::new();

    let output = env.run(&["append", "items", "[1,2]"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("must be a JSON object"));
    assert!(!env.data_dir().join("items.json").exists());
}

#[test]
fn test_rejects_invalid_collection_name() {
    let env = Env::new();
    let output = env.run(&["list", "../escape"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
}

#[test]
fn test_get_missing_record_fails() {
    let env = Env::new();
    let output = env.run(&["get", "items", "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_update_requires_where() {
    let env = Env::new();
    env.run_ok(&["append", "items", r#"{"name":"Foo"}"#]);

    let output = env.run(&["update", "items", "--set", r#"{"name":"Bar"}"#]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--where"));

    let on_disk = file_lines(&env.data_dir().join("items.json"));
    assert_eq!(on_disk[0]["name"], "Foo");
}

#[test]
fn test_config_controls_reserved_fields() {
    let env = Env::new();
    env.write_config(
        "[collection]\nprimary_key = \"_key\"\nkey_length = 10\nfingerprint_key = \"\"\nauto_persist = false\n",
    );

    let created = json_lines(&env.run_ok(&["append", "notes", r#"{"text":"hi"}"#]));
    let record = created[0].as_object().expect("object");
    assert_eq!(record["_key"].as_str().map(str::len), Some(10));
    assert!(!record.contains_key("id"));
    assert!(!record.contains_key("hash"));

    // Without auto-persist the CLI commits explicitly.
    let on_disk = file_lines(&env.data_dir().join("notes.json"));
    assert_eq!(on_disk, created);
}

#[test]
fn test_corrupt_collection_reports_serialization_error() {
    let env = Env::new();
    std::fs::create_dir_all(env.data_dir()).expect("create data dir");
    std::fs::write(env.data_dir().join("broken.json"), "{\"a\":1}\n{oops").expect("write");

    let output = env.run(&["list", "broken"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Serialization error"));
    assert!(stderr.contains("line 2"));
}
