use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

/// Command isolated from the caller's settings and credentials.
fn reqdispatch(config_home: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("reqdispatch"));
    cmd.env_remove("REQDISPATCH_CONFIG")
        .env_remove("REQDISPATCH_TOKEN")
        .env_remove("REQDISPATCH_PROXY")
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env("NO_COLOR", "1");
    cmd
}

fn write_settings(dir: &Path, server_url: &str) -> std::path::PathBuf {
    let path = dir.join("settings.json");
    let settings = json!({
        "endpoints": {
            "PING": [format!("{}/api/network/ping", server_url)],
            "EARN_INFO": format!("{}/api/earn/info", server_url),
            "MISSION": format!("{}/api/mission", server_url),
            "COMPLETE_MISSION": format!("{}/api/mission/complete", server_url),
            "ACTIVATE": format!("{}/api/auth/activate", server_url)
        },
        "timeout_secs": 5,
        "referer": "https://app.example.com/"
    });
    std::fs::write(&path, settings.to_string()).unwrap();
    path
}

#[test]
fn test_get_known_endpoint_sends_browser_headers() {
    let mut server = Server::new();
    let url = server.url();
    let dir = tempdir().unwrap();
    let config = write_settings(dir.path(), &url);

    let mock = server
        .mock("GET", "/api/earn/info")
        .match_header("authorization", "Bearer secret")
        .match_header("referer", "https://app.example.com/")
        .match_header("sec-fetch-mode", "cors")
        .match_header("accept", "*/*")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": {"total_earning": 42}}"#)
        .expect(1)
        .create();

    reqdispatch(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["get", &format!("{}/api/earn/info", url), "--token", "secret"])
        .assert()
        .success()
        .stdout(predicates::str::contains("\"total_earning\": 42"));

    mock.assert();
}

#[test]
fn test_post_generic_url_sends_minimal_headers_and_body() {
    let mut server = Server::new();
    let url = server.url();
    let dir = tempdir().unwrap();
    let config = write_settings(dir.path(), &url);

    let mock = server
        .mock("POST", "/api/other")
        .match_header("accept", "application/json")
        .match_header("referer", Matcher::Missing)
        .match_header(
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36",
        )
        .match_body(Matcher::Json(json!({"id": "abc", "version": "2.2.7"})))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create();

    reqdispatch(dir.path())
        .env("REQDISPATCH_TOKEN", "from-env")
        .arg("--config")
        .arg(&config)
        .args([
            "--profile",
            "chrome110",
            "post",
            &format!("{}/api/other", url),
            "--data",
            r#"{"id": "abc", "version": "2.2.7"}"#,
        ])
        .assert()
        .success()
        .stdout(predicates::str::contains("\"success\": true"));

    mock.assert();
}

#[test]
fn test_exhausted_retries_fail_with_message() {
    let mut server = Server::new();
    let url = server.url();
    let dir = tempdir().unwrap();

    let mock = server
        .mock("GET", "/api/down")
        .with_status(500)
        .with_body("maintenance")
        .expect(1)
        .create();

    reqdispatch(dir.path())
        .args([
            "--max-retries",
            "1",
            "get",
            &format!("{}/api/down", url),
            "--token",
            "t",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Max retries reached"))
        .stderr(predicates::str::contains("HTTP 500"));

    mock.assert();
}

#[test]
fn test_rate_limited_then_exhausted() {
    let mut server = Server::new();
    let url = server.url();
    let dir = tempdir().unwrap();

    let mock = server
        .mock("GET", "/api/busy")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(2)
        .create();

    reqdispatch(dir.path())
        .args([
            "--max-retries",
            "2",
            "get",
            &format!("{}/api/busy", url),
            "--token",
            "t",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Rate limited (429)"))
        .stderr(predicates::str::contains("Retry 1/2"));

    mock.assert();
}

#[test]
fn test_non_object_data_fails_without_request() {
    let mut server = Server::new();
    let url = server.url();
    let dir = tempdir().unwrap();

    let mock = server.mock("POST", Matcher::Any).expect(0).create();

    reqdispatch(dir.path())
        .args([
            "post",
            &format!("{}/api/other", url),
            "--data",
            "[1, 2, 3]",
            "--token",
            "t",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid argument"));

    mock.assert();
}

#[test]
fn test_invalid_data_json_fails() {
    let dir = tempdir().unwrap();

    reqdispatch(dir.path())
        .args([
            "post",
            "http://127.0.0.1:9/api",
            "--data",
            "{not json",
            "--token",
            "t",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--data is not valid JSON"));
}

#[test]
fn test_missing_token_is_usage_error() {
    let dir = tempdir().unwrap();

    reqdispatch(dir.path())
        .args(["get", "http://127.0.0.1:9/api"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--token"));
}

#[test]
fn test_bad_settings_file_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("broken.json");
    std::fs::write(&config, r#"{"timeout_secs": 0}"#).unwrap();

    reqdispatch(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["get", "http://127.0.0.1:9/api", "--token", "t"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid settings file"));
}

#[test]
fn test_version_flag() {
    let dir = tempdir().unwrap();

    reqdispatch(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("reqdispatch"));
}
