//! Test-only fakes for the CLI runner, prompts and workspace layout.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{App, EnvTier, LinkMode, RemoteProject, Reply, Team};
use crate::io::prompt::Prompter;
use crate::io::vercel::{Captured, CommandFailed, CommandRunner, Invocation};

/// Canned response for one CLI invocation.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Ok(Captured),
    /// Non-zero exit with this stderr.
    Fail(String),
}

/// Command runner returning scripted responses keyed by the joined arguments.
///
/// Each key holds a queue; the last response of a queue repeats. Unscripted
/// invocations succeed with empty output. Every invocation is recorded.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: RefCell<HashMap<String, VecDeque<ScriptedResponse>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, args: &str, response: ScriptedResponse) -> Self {
        self.responses
            .borrow_mut()
            .entry(args.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn on_ok(self, args: &str, captured: Captured) -> Self {
        self.on(args, ScriptedResponse::Ok(captured))
    }

    pub fn on_fail(self, args: &str, stderr: &str) -> Self {
        self.on(args, ScriptedResponse::Fail(stderr.to_string()))
    }

    /// A listing command that honours `--format json`.
    pub fn on_json(self, args: &str, json: &str) -> Self {
        self.on_ok(args, Captured::stdout(json))
    }

    /// A listing command from a CLI release without `--format json`: the JSON
    /// request is rejected and the plain call prints `text` on stderr.
    pub fn on_text(self, args: &str, text: &str) -> Self {
        self.on_fail(
            &format!("{args} --format json"),
            "Error: unknown or unexpected option: --format",
        )
        .on_ok(
            args,
            Captured {
                stdout: String::new(),
                stderr: text.to_string(),
            },
        )
    }

    /// Joined arguments of every invocation, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Invocation::display).collect()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    fn respond(&self, invocation: &Invocation) -> Result<Captured> {
        self.calls.borrow_mut().push(invocation.clone());
        let key = invocation.display();
        let response = {
            let mut responses = self.responses.borrow_mut();
            match responses.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match response {
            Some(ScriptedResponse::Ok(captured)) => Ok(captured),
            Some(ScriptedResponse::Fail(stderr)) => Err(CommandFailed {
                command: format!("vercel {key}"),
                code: Some(1),
                stderr,
            }
            .into()),
            None => Ok(Captured::default()),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        self.respond(invocation)
    }

    fn attach(&self, invocation: &Invocation) -> Result<()> {
        self.respond(invocation).map(|_| ())
    }
}

/// Prompter answering from per-decision queues. An empty queue is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    teams: VecDeque<Reply<String>>,
    apps: VecDeque<Reply<Vec<usize>>>,
    modes: VecDeque<Reply<LinkMode>>,
    projects: VecDeque<Reply<String>>,
    names: VecDeque<Reply<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(mut self, reply: Reply<String>) -> Self {
        self.teams.push_back(reply);
        self
    }

    pub fn apps(mut self, reply: Reply<Vec<usize>>) -> Self {
        self.apps.push_back(reply);
        self
    }

    pub fn mode(mut self, reply: Reply<LinkMode>) -> Self {
        self.modes.push_back(reply);
        self
    }

    pub fn project(mut self, reply: Reply<String>) -> Self {
        self.projects.push_back(reply);
        self
    }

    pub fn name(mut self, reply: Reply<String>) -> Self {
        self.names.push_back(reply);
        self
    }
}

fn next<T>(queue: &mut VecDeque<Reply<T>>, what: &str, app: Option<&App>) -> Result<Reply<T>> {
    queue.pop_front().ok_or_else(|| match app {
        Some(app) => anyhow!("unexpected {what} prompt for {}", app.name),
        None => anyhow!("unexpected {what} prompt"),
    })
}

impl Prompter for ScriptedPrompter {
    fn choose_team(&mut self, _teams: &[Team]) -> Result<Reply<String>> {
        next(&mut self.teams, "team", None)
    }

    fn choose_apps(&mut self, _apps: &[App]) -> Result<Reply<Vec<usize>>> {
        next(&mut self.apps, "apps", None)
    }

    fn choose_link_mode(&mut self, app: &App) -> Result<Reply<LinkMode>> {
        next(&mut self.modes, "link mode", Some(app))
    }

    fn choose_project(&mut self, app: &App, _projects: &[RemoteProject]) -> Result<Reply<String>> {
        next(&mut self.projects, "project", Some(app))
    }

    fn project_name(&mut self, app: &App, _default: &str) -> Result<Reply<String>> {
        next(&mut self.names, "project name", Some(app))
    }
}

/// Temporary workspace with an `apps/` directory.
pub struct TestWorkspace {
    temp: TempDir,
}

impl TestWorkspace {
    /// Create `apps/<name>` for every name (the `apps/` directory always exists).
    pub fn new(apps: &[&str]) -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        fs::create_dir_all(temp.path().join("apps")).context("create apps dir")?;
        for name in apps {
            fs::create_dir_all(temp.path().join("apps").join(name))
                .with_context(|| format!("create app {name}"))?;
        }
        Ok(Self { temp })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn app_dir(&self, name: &str) -> PathBuf {
        self.root().join("apps").join(name)
    }

    pub fn env_path(&self, app: &str, tier: EnvTier) -> PathBuf {
        self.app_dir(app).join(tier.file_name())
    }

    pub fn write_env(&self, app: &str, tier: EnvTier, contents: &str) -> Result<()> {
        let path = self.env_path(app, tier);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    pub fn read_env(&self, app: &str, tier: EnvTier) -> Result<String> {
        let path = self.env_path(app, tier);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }
}

/// App record under a fixed fake workspace.
pub fn app(name: &str) -> App {
    App {
        path: PathBuf::from("/workspace/apps").join(name),
        name: name.to_string(),
    }
}

/// Team whose slug equals its id, as the plain-text listing reports it.
pub fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        slug: id.to_string(),
        name: name.to_string(),
    }
}

/// Render a `teams ls` table; the first team is marked current.
pub fn team_table(teams: &[(&str, &str)]) -> String {
    let mut buf = String::from("> Fetching teams\n\n  id                 Team name\n");
    for (idx, (id, name)) in teams.iter().enumerate() {
        let marker = if idx == 0 { '✔' } else { ' ' };
        buf.push_str(&format!("{marker} {id:<18} {name}\n"));
    }
    buf
}
