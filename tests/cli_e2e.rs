//! End-to-end CLI tests for the contentdm binary.

mod support;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::json;
use support::socket_guard::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// Binary with config lookup pointed at an empty directory.
fn isolated_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("contentdm").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("contentdm").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONTENTdm"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("contentdm").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("contentdm"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("contentdm").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_unconfigured_collections_fails_with_message() {
    let config_home = TempDir::new().unwrap();
    isolated_cmd(&config_home)
        .arg("collections")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[test]
fn test_config_show_reads_config_file() {
    let config_home = TempDir::new().unwrap();
    let config_dir = config_home.path().join("contentdm");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "hostname = \"cdm.example.org\"\nport = 81\n",
    )
    .unwrap();

    isolated_cmd(&config_home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = loaded"))
        .stdout(predicate::str::contains(
            "rpc_endpoint = http://cdm.example.org:81/dmwebservices/index.php?",
        ));
}

#[test]
fn test_invalid_config_file_fails() {
    let config_home = TempDir::new().unwrap();
    let config_dir = config_home.path().join("contentdm");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "port = seventy\n").unwrap();

    isolated_cmd(&config_home)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_collections_prints_json_from_server() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/dmwebservices/index.php"))
        .and(query_param("q", "dmGetCollectionList/0/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"alias": "/demo", "name": "Demo", "path": "/cdm/demo", "secondary_alias": "demo"}
        ])))
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    let port = mock_server.address().port().to_string();
    let output = tokio::task::spawn_blocking(move || {
        isolated_cmd(&config_home)
            .args(["--host", "127.0.0.1", "--port", port.as_str(), "collections", "--published"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("\"alias\": \"/demo\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_writes_file_and_prints_path() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/cgi-bin/showfile.exe"))
        .and(query_param("CISOROOT", "demo"))
        .and(query_param("CISOPTR", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"image".to_vec()))
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    let download_dir = TempDir::new().unwrap();
    let output_path = download_dir.path().to_path_buf();
    let port = mock_server.address().port().to_string();
    let output = tokio::task::spawn_blocking(move || {
        isolated_cmd(&config_home)
            .args(["-q", "--host", "127.0.0.1", "--port", port.as_str(), "download", "demo", "12"])
            .arg("harbor.jpg")
            .arg("-o")
            .arg(&output_path)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("harbor.jpg"));
    assert_eq!(
        std::fs::read(download_dir.path().join("harbor.jpg")).unwrap(),
        b"image"
    );
}
