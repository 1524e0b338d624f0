//! CLI tests for the `env` and `apps` commands.
//!
//! Spawns the vlink binary against a temporary workspace. Neither command
//! invokes the deployment CLI.

use std::process::Command;

use vlink::core::types::EnvTier;
use vlink::exit_codes;
use vlink::test_support::TestWorkspace;

fn vlink(ws: &TestWorkspace) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vlink"));
    cmd.arg("--root").arg(ws.root()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn env_writes_all_three_tiers() {
    let ws = TestWorkspace::new(&["web"]).expect("workspace");
    ws.write_env("web", EnvTier::Preview, "export NEXT_PUBLIC_APP_URL=\"old\"\r\nKEEP=1\r\n")
        .expect("write");

    let output = vlink(&ws)
        .args(["env", "web", "--project", "my-project", "--team", "my-team"])
        .output()
        .expect("vlink env");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "production\tupdated\nstaging\tupdated\npreview\tupdated\n");

    assert_eq!(
        ws.read_env("web", EnvTier::Staging).expect("read"),
        "APP_URL=https://my-project-env-staging-my-team.vercel.app\n\
         AUTH_URL=https://my-project-env-staging-my-team.vercel.app\n\
         API_URL=https://my-project-env-staging-my-team.vercel.app\n"
    );
    let preview = ws.read_env("web", EnvTier::Preview).expect("read");
    assert!(preview.starts_with(
        "export NEXT_PUBLIC_APP_URL=\"https://my-project-my-team.vercel.app\"\r\nKEEP=1\r\n"
    ));
}

#[test]
fn env_second_run_reports_unchanged() {
    let ws = TestWorkspace::new(&["web"]).expect("workspace");
    let args = ["env", "web", "--project", "p", "--team", "t"];

    let first = vlink(&ws).args(args).output().expect("first run");
    assert_eq!(first.status.code(), Some(exit_codes::OK));

    let second = vlink(&ws).args(args).output().expect("second run");
    assert_eq!(second.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&second.stdout),
        "production\tunchanged\nstaging\tunchanged\npreview\tunchanged\n"
    );
}

#[test]
fn env_unknown_app_fails() {
    let ws = TestWorkspace::new(&["web"]).expect("workspace");
    let output = vlink(&ws)
        .args(["env", "ghost", "--project", "p", "--team", "t"])
        .output()
        .expect("vlink env");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("app ghost not found"));
}

#[test]
fn apps_lists_sorted_names() {
    let ws = TestWorkspace::new(&["web", "admin", "backend"]).expect("workspace");
    std::fs::write(ws.root().join("apps").join("README.md"), "not an app").expect("write");

    let output = vlink(&ws).arg("apps").output().expect("vlink apps");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "admin\nbackend\nweb\n");
}

#[test]
fn apps_without_app_dirs_is_nothing_to_do() {
    let ws = TestWorkspace::new(&[]).expect("workspace");
    let output = vlink(&ws).arg("apps").output().expect("vlink apps");
    assert_eq!(output.status.code(), Some(exit_codes::NOTHING_TO_DO));
}
