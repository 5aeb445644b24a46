//! CLI integration tests using assert_cmd.
//!
//! These tests cover argument handling only; nothing here reaches gcloud.

mod common;

use assert_cmd::cargo_bin_cmd;
use common::TestContext;
use predicates::prelude::*;
use predicates::str::contains;

/// The binary with a throwaway HOME so no real config is picked up.
fn cmd(ctx: &TestContext) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("secret-edit");
    cmd.env("HOME", &ctx.temp_path)
        .env_remove("SECRET_EDIT_PROJECT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help_flag() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("edit GCP Secret Manager secrets"))
        .stdout(contains("--project"))
        .stdout(contains("--list"));
}

#[test]
fn test_boolean_flags_take_no_value() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("[default: false]").not());

    cmd(&ctx)
        .args(["--list", "--verbose"])
        .assert()
        .failure()
        .stderr(contains("missing required argument: --project"));
}

#[test]
fn test_cli_version_flag() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx).arg("--version").assert().success();
}

#[test]
fn test_missing_project_fails() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx)
        .arg("my-secret")
        .assert()
        .failure()
        .stderr(contains("missing required argument: --project"));
}

#[test]
fn test_missing_secret_id_fails() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx)
        .args(["--project", "p"])
        .assert()
        .failure()
        .stderr(contains("missing required argument: SECRET_ID"));
}

#[test]
fn test_invalid_version_rejected() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx)
        .args(["--project", "p", "--from-version", "newest", "my-secret"])
        .assert()
        .failure()
        .stderr(contains("invalid version"));
}

#[test]
fn test_missing_config_file_fails() {
    let ctx = TestContext::new().unwrap();
    cmd(&ctx)
        .args(["--config"])
        .arg(ctx.temp_path.join("nope.yaml"))
        .args(["--project", "p", "--list"])
        .assert()
        .failure()
        .stderr(contains("Failed to read config file"));
}

#[test]
fn test_project_from_config_and_unavailable_gcloud() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .create_file(
            "config.yaml",
            "project: from-config\ngcloud: nonexistent_gcloud_command_xyz\n",
        )
        .unwrap();

    cmd(&ctx)
        .arg("--config")
        .arg(&config)
        .arg("--list")
        .assert()
        .failure()
        .stderr(contains("secret manager unavailable"));
}

#[test]
fn test_project_from_env() {
    let ctx = TestContext::new().unwrap();
    ctx.create_file("config.yaml", "gcloud: nonexistent_gcloud_command_xyz\n")
        .unwrap();

    cmd(&ctx)
        .env("SECRET_EDIT_PROJECT", "env-proj")
        .arg("--config")
        .arg(ctx.temp_path.join("config.yaml"))
        .arg("--list")
        .assert()
        .failure()
        .stderr(contains("secret manager unavailable"))
        .stderr(contains("missing required argument").not());
}
