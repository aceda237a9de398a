//! Integration tests for CLI output behavior.
//!
//! Every command runs with HOME and the working directory pointed at a temp
//! dir so no real user config or token leaks into the test.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;

fn c4c(home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_c4c"));
    command
        .current_dir(home)
        .env("HOME", home)
        .env_remove("C4C_TOKEN")
        .env_remove("C4C_API_URL")
        .env_remove("RUST_LOG");
    command
}

fn run(home: &Path, args: &[&str]) -> Output {
    c4c(home)
        .args(args)
        .output()
        .expect("Failed to execute c4c")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Serve a single HTTP request with a JSON body on a loopback port.
fn serve_json_once(body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });

    base
}

#[test]
fn test_help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    for command in ["status", "watch", "start", "stop", "project"] {
        assert!(stdout.contains(command), "missing '{command}' in: {stdout}");
    }
}

#[test]
fn test_project_prints_progress_and_remaining() {
    let home = tempfile::tempdir().unwrap();
    let output = run(
        home.path(),
        &[
            "project",
            "--remaining",
            "18",
            "--rate",
            "0.35",
            "--tokens",
            "2.3",
            "--balance",
            "10.5",
        ],
    );

    assert!(
        output.status.success(),
        "c4c project failed. stderr: {}",
        stderr(&output)
    );
    let stdout = stdout(&output);
    assert!(stdout.contains("25.0%"), "{stdout}");
    assert!(stdout.contains("18.0h"), "{stdout}");
    assert!(stdout.contains("8.40"), "{stdout}");
    assert!(stdout.contains("12.80"), "{stdout}");

    // Logs go to stderr; stdout is clean
    assert!(!stdout.contains("\"event\""), "{stdout}");
}

#[test]
fn test_project_json_is_parseable() {
    let home = tempfile::tempdir().unwrap();
    let output = run(
        home.path(),
        &["project", "--remaining", "6", "--rate", "1", "--json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be valid JSON");
    assert_eq!(json["progressPercent"], 75.0);
    assert_eq!(json["remaining"], "6.0h");
    assert_eq!(json["sessionYieldEstimate"], 24.0);
    assert_eq!(json["walletTotal"], 0.0);
}

#[test]
fn test_project_inactive_session_is_offline() {
    let home = tempfile::tempdir().unwrap();
    let output = run(
        home.path(),
        &[
            "project",
            "--remaining",
            "10",
            "--tokens",
            "3",
            "--balance",
            "5",
            "--inactive",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("0.0%"), "{stdout}");
    assert!(stdout.contains("offline"), "{stdout}");
    assert!(stdout.contains("Wallet total:  5.00"), "{stdout}");
}

#[test]
fn test_project_clamps_overlong_remaining() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["project", "--remaining", "30", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["progressPercent"], 0.0);
    assert_eq!(json["remaining"], "24.0h");
}

#[test]
fn test_status_without_token_fails_with_hint() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["status"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No token"), "{}", stderr(&output));
}

#[test]
fn test_status_rejects_non_student_role() {
    let home = tempfile::tempdir().unwrap();
    let output = run(
        home.path(),
        &["status", "--token", "tok", "--role", "college_admin"],
    );

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("only available to students"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_status_reports_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);

    let home = tempfile::tempdir().unwrap();
    let output = c4c(home.path())
        .env("C4C_API_URL", &base)
        .env("C4C_TOKEN", "tok")
        .arg("status")
        .output()
        .expect("Failed to execute c4c");

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("Failed to fetch mining dashboard"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_status_json_outputs_rows() {
    let body = serde_json::json!({
        "miningColleges": [{ "id": 7, "name": "State University" }],
        "activeSessions": [{
            "college": 7,
            "isActive": true,
            "remainingHours": 18,
            "earningRate": 0.35,
            "currentTokens": 2.3
        }],
        "wallets": [{ "college": 7, "balance": 10.5 }]
    });
    let base = serve_json_once(body.to_string());

    let home = tempfile::tempdir().unwrap();
    let output = c4c(home.path())
        .env("C4C_API_URL", &base)
        .args(["status", "--json", "--token", "tok"])
        .output()
        .expect("Failed to execute c4c");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be valid JSON");
    let row = &json["rows"][0];
    assert_eq!(row["college"], "7");
    assert_eq!(row["name"], "State University");
    assert_eq!(row["projection"]["progressPercent"], 25.0);
    assert_eq!(row["projection"]["remaining"], "18.0h");
}

#[test]
fn test_config_warning_on_invalid_toml() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".c4c");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "invalid toml [[[").unwrap();

    // Fails for lack of a token, after loading config
    let output = run(home.path(), &["status"]);

    let stderr = stderr(&output);
    assert!(
        stderr.contains("Warning: Could not load config"),
        "Expected warning in stderr, got: {}",
        stderr
    );
    assert!(stderr.contains("Tip: Check"), "{stderr}");
}

#[test]
fn test_token_from_config_file_is_used() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".c4c");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[auth]\ntoken = \"from-config\"\nrole = \"student\"\n\n[api]\nbase_url = \"http://127.0.0.1:9/api\"\nrequest_timeout_secs = 2\n",
    )
    .unwrap();

    let output = run(home.path(), &["status"]);

    let stderr = stderr(&output);
    assert!(!stderr.contains("No token"), "{stderr}");
    assert!(!stderr.contains("Warning: Could not load config"), "{stderr}");
    assert!(stderr.contains("Failed to fetch mining dashboard"), "{stderr}");
}
