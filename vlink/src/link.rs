//! Orchestration for `vlink link`.
//!
//! The workflow runs once, sequentially:
//!
//! 1. auth check (`whoami`)
//! 2. team discovery, selection and activation
//! 3. app discovery and selection
//! 4. phase 1: per app, link or create a project, then sync env files
//! 5. phase 2: sync env files of every linked app again, so apps handled
//!    before their backend sibling pick up its URL
//!
//! Per-app failures are isolated: the app is marked skipped and the loop
//! continues. Only the auth check, team activation and the project listing
//! abort the run.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::apps::{discover_apps, select_apps_interactive};
use crate::core::types::{App, LinkMode, RemoteProject, Reply, Team};
use crate::exit_codes;
use crate::io::config::LinkerConfig;
use crate::io::env_files::{EnvFileUpdateResult, EnvSyncDeps};
use crate::io::prompt::Prompter;
use crate::io::vercel::{CommandRunner, Invocation};
use crate::projects::{create_project, fetch_remote_projects, link_project};
use crate::sync::{backend_dir, ensure_synced, sync_app_env};
use crate::teams::{fetch_vercel_teams, select_team_interactive, switch_to_team};

/// How the workflow ended (when it did not fail outright).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Both phases ran; individual apps may still have been skipped.
    Success,
    /// The CLI listed no teams.
    NoTeams,
    /// The workspace has no app directories.
    NoApps,
    /// The operator aborted team or app selection.
    Cancelled,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success | RunStatus::Cancelled => exit_codes::OK,
            RunStatus::NoTeams | RunStatus::NoApps => exit_codes::NOTHING_TO_DO,
        }
    }
}

/// Where an app ended up. Any state may move to `Skipped`; nothing moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    Selected,
    Linked,
    EnvSynced,
    Done,
    Skipped,
}

/// Per-app record of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AppReport {
    pub app: String,
    pub project: Option<String>,
    pub state: AppState,
    pub error: Option<String>,
    pub env: Vec<EnvFileUpdateResult>,
}

impl AppReport {
    fn new(app: &App) -> Self {
        Self {
            app: app.name.clone(),
            project: None,
            state: AppState::Selected,
            error: None,
            env: Vec::new(),
        }
    }

    fn skip(&mut self, err: &anyhow::Error) {
        self.state = AppState::Skipped;
        self.error = Some(format!("{err:#}"));
    }
}

/// Result of `run_link`.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub team: Option<Team>,
    pub apps: Vec<AppReport>,
}

impl RunOutcome {
    fn ended(status: RunStatus, team: Option<Team>) -> Self {
        Self {
            status,
            team,
            apps: Vec::new(),
        }
    }

    pub fn skipped(&self) -> impl Iterator<Item = &AppReport> {
        self.apps.iter().filter(|r| r.state == AppState::Skipped)
    }
}

/// Run the full linking workflow for the workspace at `root`.
pub fn run_link<R, P>(
    root: &Path,
    cfg: &LinkerConfig,
    runner: &R,
    prompter: &mut P,
) -> Result<RunOutcome>
where
    R: CommandRunner + ?Sized,
    P: Prompter + ?Sized,
{
    ensure_logged_in(runner, cfg)?;

    let teams = fetch_vercel_teams(runner, &cfg.json_flag)?;
    if teams.is_empty() {
        warn!("no teams found, nothing to link");
        return Ok(RunOutcome::ended(RunStatus::NoTeams, None));
    }
    let team = match select_team_interactive(&teams, prompter)? {
        Reply::Answered(team) => team,
        Reply::Cancelled => return Ok(RunOutcome::ended(RunStatus::Cancelled, None)),
    };
    switch_to_team(&team.slug, runner)?;

    let discovered = discover_apps(root, &cfg.apps_dir)?;
    if discovered.is_empty() {
        warn!(dir = %root.join(&cfg.apps_dir).display(), "no apps found, nothing to link");
        return Ok(RunOutcome::ended(RunStatus::NoApps, Some(team)));
    }
    let selected = match select_apps_interactive(&discovered, prompter)? {
        Reply::Answered(apps) => apps,
        Reply::Cancelled => return Ok(RunOutcome::ended(RunStatus::Cancelled, Some(team))),
    };

    let mut projects =
        fetch_remote_projects(runner, &cfg.json_flag).context("fetch remote projects")?;
    let deps = EnvSyncDeps::from_config(cfg, backend_dir(&discovered, cfg));

    let mut reports = Vec::with_capacity(selected.len());
    for app in &selected {
        let mut report = AppReport::new(app);
        match link_app(app, &team, &mut projects, runner, prompter) {
            Ok(project) => {
                report.state = AppState::Linked;
                report.env = sync_app_env(app, &project, &team.slug, &deps);
                report.state = AppState::EnvSynced;
                report.project = Some(project);
            }
            Err(err) => {
                error!(app = %app.name, err = %format!("{err:#}"), "error processing app");
                warn!(app = %app.name, "skipping app, continuing");
                report.skip(&err);
            }
        }
        reports.push(report);
    }

    for (app, report) in selected.iter().zip(reports.iter_mut()) {
        let Some(project) = report.project.clone() else {
            continue;
        };
        if report.state == AppState::Skipped {
            continue;
        }
        let results = sync_app_env(app, &project, &team.slug, &deps);
        match ensure_synced(&results) {
            Ok(()) => report.state = AppState::Done,
            Err(err) => {
                warn!(app = %app.name, err = %format!("{err:#}"), "skipping env update for this app");
                report.skip(&err);
            }
        }
        report.env = results;
    }

    let outcome = RunOutcome {
        status: RunStatus::Success,
        team: Some(team),
        apps: reports,
    };
    let skipped = outcome.skipped().count();
    info!(
        linked = outcome.apps.len() - skipped,
        skipped, "linking finished"
    );
    Ok(outcome)
}

fn ensure_logged_in<R: CommandRunner + ?Sized>(runner: &R, cfg: &LinkerConfig) -> Result<()> {
    let captured = runner
        .capture(&Invocation::new(["whoami"]))
        .with_context(|| format!("login required: run `{} login` first", cfg.cli))?;
    let user = captured.stdout.trim();
    if !user.is_empty() {
        info!(user, "authenticated");
    }
    Ok(())
}

/// Phase 1 for a single app. Returns the project the app is now linked to.
#[instrument(skip_all, fields(app = %app.name))]
fn link_app<R, P>(
    app: &App,
    team: &Team,
    projects: &mut Vec<RemoteProject>,
    runner: &R,
    prompter: &mut P,
) -> Result<String>
where
    R: CommandRunner + ?Sized,
    P: Prompter + ?Sized,
{
    let mode = if projects.is_empty() {
        info!(app = %app.name, "no existing projects, creating a new one");
        LinkMode::Create
    } else {
        answered(prompter.choose_link_mode(app)?, "link mode")?
    };

    match mode {
        LinkMode::Existing => {
            let project = answered(prompter.choose_project(app, projects)?, "project choice")?;
            link_project(runner, app, &project, &team.slug)?;
            Ok(project)
        }
        LinkMode::Create => {
            let project = answered(prompter.project_name(app, &app.name)?, "project name")?;
            create_project(runner, &project, &team.slug)?;
            link_project(runner, app, &project, &team.slug)?;
            projects.push(RemoteProject {
                name: project.clone(),
                framework: None,
            });
            Ok(project)
        }
    }
}

/// Inside a per-app step, cancellation skips the app.
fn answered<T>(reply: Reply<T>, what: &str) -> Result<T> {
    match reply {
        Reply::Answered(value) => Ok(value),
        Reply::Cancelled => Err(anyhow!("{what} cancelled by operator")),
    }
}
