use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_vault"))
}

/// Isolated XDG home for one test.
struct Env {
    root: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Self {
            root: tempfile::tempdir().expect("tempdir"),
        };
        std::fs::create_dir_all(env.config_home()).expect("create config dir");
        std::fs::create_dir_all(env.data_home()).expect("create data dir");
        env
    }

    fn config_home(&self) -> PathBuf {
        self.root.path().join("c")
    }

    fn data_home(&self) -> PathBuf {
        self.root.path().join("d")
    }

    fn command(&self, password: Option<&str>) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.data_home())
            .env_remove("VAULT_CONFIG")
            .env("VAULT_LOG", "off")
            .env_remove("VAULT_PASSWORD");
        if let Some(password) = password {
            cmd.env("VAULT_PASSWORD", password);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(None)
            .args(args)
            .output()
            .expect("run vault")
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(None)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn vault");
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(input.as_bytes())
            .expect("write stdin");
        child.wait_with_output().expect("wait vault")
    }

    fn run_with_password(&self, password: &str, args: &[&str]) -> Output {
        self.command(Some(password))
            .args(args)
            .output()
            .expect("run vault")
    }

    fn init(&self) {
        let output = self.run(&["init"]);
        assert_success(&output);
    }

    fn register(&self, login: &str, password: &str) {
        let output = self.run_with_password(password, &["register", "--login", login]);
        assert_success(&output);
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: status={:?}\nstdout={}\nstderr={}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn add_text(env: &Env, text: &str) -> String {
    let output = env.run(&["--quiet", "text", "add", text]);
    assert_success(&output);
    stdout(&output)
}

#[test]
fn test_init_creates_files_once() {
    let env = Env::new();
    env.init();

    let config_path = env.config_home().join("vault").join("config.toml");
    let config = std::fs::read_to_string(&config_path).expect("config written");
    assert!(config.contains("[storage]"));
    assert!(config.contains("[session]"));
    assert!(env.config_home().join("vault").join("session.secret").exists());
    assert!(env.data_home().join("vault").join("vault.db").exists());

    let again = env.run(&["init"]);
    assert_eq!(again.status.code(), Some(4));
}

#[test]
fn test_init_can_be_retried_after_failure() {
    let env = Env::new();
    let blocker = env.root.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");
    let bad_database = blocker.join("vault.db");

    let failed = env.run(&["init", "--database", bad_database.to_str().expect("utf8")]);
    assert!(!failed.status.success());
    assert!(!env.config_home().join("vault").join("session.secret").exists());
    assert!(!env.config_home().join("vault").join("config.toml").exists());

    env.init();
    env.register("alice", "pw1");
}

#[test]
fn test_init_reuses_leftover_secret() {
    let env = Env::new();
    let secret_path = env.config_home().join("vault").join("session.secret");
    std::fs::create_dir_all(secret_path.parent().expect("parent")).expect("config dir");
    let leftover = "c2VjcmV0LXNlY3JldC1zZWNyZXQtc2VjcmV0LXNlY3JldA==";
    std::fs::write(&secret_path, leftover).expect("write secret");

    env.init();
    assert_eq!(
        std::fs::read_to_string(&secret_path).expect("secret"),
        leftover
    );
    env.register("alice", "pw1");
}

#[test]
fn test_commands_before_init_report_not_found() {
    let env = Env::new();
    let output = env.run_with_password("pw1", &["register", "--login", "alice"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("vault init"));
}

#[test]
fn test_text_round_trip() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let id = add_text(&env, "hello world");
    let output = env.run(&["text", "show", &id]);
    assert_success(&output);
    assert_eq!(stdout(&output), "hello world");

    let output = env.run(&["text", "show", &id, "--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(value["text"], "hello world");
    assert_eq!(value["id"], id.as_str());

    assert_success(&env.run(&["text", "delete", &id]));
    assert_eq!(env.run(&["text", "show", &id]).status.code(), Some(3));
}

#[test]
fn test_other_user_cannot_see_record() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");
    let id = add_text(&env, "alice secret");

    env.register("bob", "pw2");
    let output = env.run(&["text", "show", &id]);
    assert_eq!(output.status.code(), Some(3));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("alice secret"));
    assert_eq!(env.run(&["text", "delete", &id]).status.code(), Some(3));

    // Alice still has it after logging back in.
    assert_success(&env.run_with_password("pw1", &["login", "--login", "alice"]));
    let output = env.run(&["text", "show", &id]);
    assert_success(&output);
    assert_eq!(stdout(&output), "alice secret");
}

#[test]
fn test_auth_and_conflict_exit_codes() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let wrong = env.run_with_password("nope", &["login", "--login", "alice"]);
    assert_eq!(wrong.status.code(), Some(5));
    let unknown = env.run_with_password("pw1", &["login", "--login", "mallory"]);
    assert_eq!(unknown.status.code(), Some(5));
    assert_eq!(wrong.stderr, unknown.stderr);

    let duplicate = env.run_with_password("pw9", &["register", "--login", "alice"]);
    assert_eq!(duplicate.status.code(), Some(6));
}

#[test]
fn test_logout_requires_new_login() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");
    assert_success(&env.run(&["whoami"]));

    assert_success(&env.run(&["logout"]));
    assert!(!env.data_home().join("vault").join("session.token").exists());

    let output = env.run(&["text", "add", "x"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(env.run(&["whoami"]).status.code(), Some(5));
}

#[test]
fn test_tampered_session_rejected() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let token_path = env.data_home().join("vault").join("session.token");
    let mut token = std::fs::read_to_string(&token_path).expect("token");
    let last = token.pop().expect("non-empty token");
    token.push(if last == 'A' { 'B' } else { 'A' });
    std::fs::write(&token_path, token).expect("write token");

    assert_eq!(env.run(&["whoami"]).status.code(), Some(5));
}

#[test]
fn test_invalid_record_id() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");
    assert_eq!(
        env.run(&["text", "show", "not-a-uuid"]).status.code(),
        Some(4)
    );
}

#[test]
fn test_binary_round_trip_and_no_overwrite() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let source_dir = env.root.path().join("src");
    std::fs::create_dir_all(&source_dir).expect("src dir");
    let source = source_dir.join("a.txt");
    std::fs::write(&source, [0x41u8, 0x42]).expect("write source");

    let output = env.run(&["binary", "add", source.to_str().expect("utf8"), "--json"]);
    assert_success(&output);
    let receipt: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(receipt["filename"], "a.txt");
    let id = receipt["id"].as_str().expect("id").to_string();

    let out_dir = env.root.path().join("out");
    std::fs::create_dir_all(&out_dir).expect("out dir");
    let out = out_dir.to_str().expect("utf8");
    assert_success(&env.run(&["binary", "get", &id, "--out", out]));
    assert_eq!(
        std::fs::read(out_dir.join("a.txt")).expect("restored"),
        vec![0x41, 0x42]
    );

    let again = env.run(&["binary", "get", &id, "--out", out]);
    assert_eq!(again.status.code(), Some(4));
}

#[test]
fn test_card_receipt_hides_secrets() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let output = env.run_with_stdin(
        &[
            "card",
            "add",
            "--holder",
            "ALICE EXAMPLE",
            "--expires",
            "09/29",
            "--json",
        ],
        "4111 1111 1111 1111\n987\n",
    );
    assert_success(&output);
    let receipt: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(receipt["cardholder_name"], "ALICE EXAMPLE");
    assert_eq!(receipt["expiration_date"], "09/29");
    assert!(receipt.get("card_number").is_none());
    assert!(receipt.get("cvv").is_none());
    assert!(receipt["created_at"].is_string());

    let id = receipt["id"].as_str().expect("id");
    let output = env.run(&["card", "show", id, "--json"]);
    assert_success(&output);
    let view: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(view["card_number"], "4111111111111111");
    assert_eq!(view["cvv"], "987");
}

#[test]
fn test_invalid_card_rejected() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let output = env.run_with_stdin(
        &["card", "add", "--holder", "A", "--expires", "13/29"],
        "1234\n1\n",
    );
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_card_secrets_not_accepted_as_arguments() {
    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let output = env.run(&[
        "card", "add", "--number", "4111111111111111", "--holder", "A", "--expires", "09/29",
    ]);
    assert_eq!(output.status.code(), Some(2));

    // Missing CVV line on stdin.
    let output = env.run_with_stdin(
        &["card", "add", "--holder", "A", "--expires", "09/29"],
        "4111111111111111\n",
    );
    assert_eq!(output.status.code(), Some(4));
}

#[cfg(unix)]
#[test]
fn test_session_and_secret_files_private() {
    use std::os::unix::fs::PermissionsExt;

    let env = Env::new();
    env.init();
    env.register("alice", "pw1");

    let mode = |path: &Path| {
        std::fs::metadata(path)
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777
    };
    assert_eq!(
        mode(&env.data_home().join("vault").join("session.token")),
        0o600
    );
    assert_eq!(
        mode(&env.config_home().join("vault").join("session.secret")),
        0o600
    );
}

#[test]
fn test_completions() {
    let output = Command::new(bin())
        .args(["completions", "bash"])
        .output()
        .expect("run vault");
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("vault"));
}
