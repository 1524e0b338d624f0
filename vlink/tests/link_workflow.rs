//! End-to-end tests for `run_link` with a scripted CLI and scripted answers.
//!
//! Each test builds a temporary workspace, scripts the `vercel` responses and
//! checks both the reported outcome and the env files left on disk.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use vlink::core::types::{EnvTier, LinkMode, Reply};
use vlink::exit_codes;
use vlink::io::config::LinkerConfig;
use vlink::link::{AppState, RunStatus, run_link};
use vlink::test_support::{ScriptedPrompter, ScriptedRunner, TestWorkspace, team_table};

const PROJECTS_JSON: &str = r#"{"projects":[{"name":"a"},{"name":"b"},{"name":"c"}]}"#;

fn existing(prompter: ScriptedPrompter, project: &str) -> ScriptedPrompter {
    prompter
        .mode(Reply::Answered(LinkMode::Existing))
        .project(Reply::Answered(project.to_string()))
}

/// Apps `a`, `b`, `c` linked to existing projects; linking `b` fails.
fn middle_link_fails() -> (TestWorkspace, ScriptedRunner, ScriptedPrompter) {
    let ws = TestWorkspace::new(&["a", "b", "c"]).expect("workspace");
    let runner = ScriptedRunner::new()
        .on_text("teams ls", &team_table(&[("acme", "Acme")]))
        .on_json("projects ls --format json", PROJECTS_JSON)
        .on_fail("link --yes --project b --scope acme", "Error: project not found");
    let mut prompter = ScriptedPrompter::new().apps(Reply::Answered(vec![0, 1, 2]));
    prompter = existing(prompter, "a");
    prompter = existing(prompter, "b");
    prompter = existing(prompter, "c");
    (ws, runner, prompter)
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_link_skips_only_that_app() {
    let (ws, runner, mut prompter) = middle_link_fails();

    let outcome =
        run_link(ws.root(), &LinkerConfig::default(), &runner, &mut prompter).expect("run");

    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.status.exit_code(), exit_codes::OK);
    let skipped: Vec<&str> = outcome.skipped().map(|r| r.app.as_str()).collect();
    assert_eq!(skipped, vec!["b"]);
    assert_eq!(outcome.apps[0].state, AppState::Done);
    assert_eq!(outcome.apps[2].state, AppState::Done);

    for tier in EnvTier::ALL {
        assert!(ws.env_path("a", tier).exists());
        assert!(!ws.env_path("b", tier).exists());
        assert!(ws.env_path("c", tier).exists());
    }
    let staging = ws.read_env("c", EnvTier::Staging).expect("read");
    assert_eq!(
        staging,
        "APP_URL=https://c-env-staging-acme.vercel.app\n\
         AUTH_URL=https://c-env-staging-acme.vercel.app\n\
         API_URL=https://c-env-staging-acme.vercel.app\n"
    );
}

#[test]
fn failed_link_logs_one_error_and_one_skip() {
    let (ws, runner, mut prompter) = middle_link_fails();
    let logs = LogBuffer::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let outcome = tracing::subscriber::with_default(subscriber, || {
        run_link(ws.root(), &LinkerConfig::default(), &runner, &mut prompter)
    })
    .expect("run");

    assert_eq!(outcome.status, RunStatus::Success);
    let text = logs.contents();
    let errors: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("error processing app"))
        .collect();
    let skips: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("skipping app, continuing"))
        .collect();
    assert_eq!(errors.len(), 1, "{text}");
    assert_eq!(skips.len(), 1, "{text}");
    assert!(errors[0].contains("app=b"), "{text}");
    assert!(skips[0].contains("app=b"), "{text}");
    assert!(text.contains("linking finished"), "{text}");
}

#[test]
fn backend_processed_later_is_picked_up_in_second_pass() {
    let ws = TestWorkspace::new(&["admin", "server"]).expect("workspace");
    ws.write_env("admin", EnvTier::Production, "# admin\nDATABASE_URL=postgres://db\n")
        .expect("write");
    let runner = ScriptedRunner::new()
        .on_text("teams ls", &team_table(&[("acme", "Acme"), ("solo", "Solo")]))
        .on_json(
            "projects ls --format json",
            r#"[{"name":"admin-web","framework":"nextjs"},{"name":"server-api"}]"#,
        );
    let mut prompter = ScriptedPrompter::new()
        .team(Reply::Answered("solo".to_string()))
        .apps(Reply::Answered(vec![]));
    prompter = existing(prompter, "admin-web");
    prompter = existing(prompter, "server-api");
    let cfg = LinkerConfig {
        backend_app: "server".to_string(),
        ..LinkerConfig::default()
    };

    let outcome = run_link(ws.root(), &cfg, &runner, &mut prompter).expect("run");

    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.team.as_ref().map(|t| t.slug.as_str()), Some("solo"));
    assert!(runner.calls().contains(&"switch solo --no-color".to_string()));

    let production = ws.read_env("admin", EnvTier::Production).expect("read");
    assert_eq!(
        production,
        "# admin\nDATABASE_URL=postgres://db\n\
         APP_URL=https://admin-web.vercel.app\n\
         AUTH_URL=https://admin-web.vercel.app\n\
         API_URL=https://server-api.vercel.app\n"
    );
    let preview = ws.read_env("admin", EnvTier::Preview).expect("read");
    assert!(preview.contains("API_URL=https://server-api-solo.vercel.app\n"));

    let server = ws.read_env("server", EnvTier::Production).expect("read");
    assert!(server.contains("API_URL=https://server-api.vercel.app\n"));
}

#[test]
fn no_teams_is_nothing_to_do() {
    let ws = TestWorkspace::new(&["web"]).expect("workspace");
    let runner = ScriptedRunner::new().on_json("teams ls --format json", r#"{"teams":[]}"#);
    let mut prompter = ScriptedPrompter::new();

    let outcome =
        run_link(ws.root(), &LinkerConfig::default(), &runner, &mut prompter).expect("run");

    assert_eq!(outcome.status, RunStatus::NoTeams);
    assert_eq!(outcome.status.exit_code(), exit_codes::NOTHING_TO_DO);
    assert!(outcome.apps.is_empty());
    assert!(!runner.calls().iter().any(|c| c.starts_with("switch")));
}

#[test]
fn empty_project_list_creates_without_asking_mode() {
    let ws = TestWorkspace::new(&["web"]).expect("workspace");
    let runner = ScriptedRunner::new()
        .on_text("teams ls", &team_table(&[("acme", "Acme")]))
        .on_json("projects ls --format json", "[]");
    let mut prompter = ScriptedPrompter::new().name(Reply::Answered("web-app".to_string()));

    let outcome =
        run_link(ws.root(), &LinkerConfig::default(), &runner, &mut prompter).expect("run");

    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.apps[0].project.as_deref(), Some("web-app"));
    let calls = runner.calls();
    let create = calls
        .iter()
        .position(|c| c == "project add web-app --scope acme")
        .expect("project add call");
    let link = calls
        .iter()
        .position(|c| c == "link --yes --project web-app --scope acme")
        .expect("link call");
    assert!(create < link);
    let production = ws.read_env("web", EnvTier::Production).expect("read");
    assert!(production.starts_with("APP_URL=https://web-app.vercel.app\n"));
}

#[test]
fn created_project_is_offered_to_later_apps() {
    let ws = TestWorkspace::new(&["api", "web"]).expect("workspace");
    let runner = ScriptedRunner::new()
        .on_text("teams ls", &team_table(&[("acme", "Acme")]))
        .on_json("projects ls --format json", "[]");
    let mut prompter = ScriptedPrompter::new()
        .apps(Reply::Answered(vec![0, 1]))
        .name(Reply::Answered("shared".to_string()));
    prompter = existing(prompter, "shared");

    let outcome =
        run_link(ws.root(), &LinkerConfig::default(), &runner, &mut prompter).expect("run");

    assert_eq!(outcome.skipped().count(), 0);
    let adds = runner
        .calls()
        .iter()
        .filter(|c| c.starts_with("project add"))
        .count();
    assert_eq!(adds, 1);
    assert_eq!(outcome.apps[1].project.as_deref(), Some("shared"));
}

#[test]
fn rerun_leaves_env_files_untouched() {
    let ws = TestWorkspace::new(&["web"]).expect("workspace");
    let script = || {
        ScriptedRunner::new()
            .on_text("teams ls", &team_table(&[("acme", "Acme")]))
            .on_json("projects ls --format json", r#"[{"name":"web"}]"#)
    };

    let mut first = existing(ScriptedPrompter::new(), "web");
    run_link(ws.root(), &LinkerConfig::default(), &script(), &mut first).expect("first run");
    let before = ws.read_env("web", EnvTier::Staging).expect("read");

    let mut second = existing(ScriptedPrompter::new(), "web");
    let outcome =
        run_link(ws.root(), &LinkerConfig::default(), &script(), &mut second).expect("second run");

    assert!(outcome.apps[0].env.iter().all(|r| !r.updated && r.error.is_none()));
    assert_eq!(ws.read_env("web", EnvTier::Staging).expect("read"), before);
}
