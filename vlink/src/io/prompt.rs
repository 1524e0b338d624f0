//! Operator prompts.
//!
//! [`Prompter`] is the seam between the workflow and the operator. Two
//! implementations exist: [`DialoguerPrompter`] for terminals and
//! [`LinePrompter`] for scripted, line-oriented answers.

use std::io::{BufRead, ErrorKind, Write};

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect, Select};
use tracing::warn;

use crate::apps::select_apps;
use crate::core::types::{App, LinkMode, RemoteProject, Reply, Team};
use crate::teams::select_team;

/// One method per operator decision in the linking workflow.
pub trait Prompter {
    /// Pick a team; answers with the team id.
    fn choose_team(&mut self, teams: &[Team]) -> Result<Reply<String>>;

    /// Pick a subset of apps; answers with indices into `apps` (possibly empty).
    fn choose_apps(&mut self, apps: &[App]) -> Result<Reply<Vec<usize>>>;

    fn choose_link_mode(&mut self, app: &App) -> Result<Reply<LinkMode>>;

    /// Pick an existing project; answers with its name.
    fn choose_project(&mut self, app: &App, projects: &[RemoteProject]) -> Result<Reply<String>>;

    /// Ask for a new project name. Blank answers are never returned.
    fn project_name(&mut self, app: &App, default: &str) -> Result<Reply<String>>;
}

/// Terminal prompts. Esc or `q` cancels.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn choose_team(&mut self, teams: &[Team]) -> Result<Reply<String>> {
        let items: Vec<String> = teams
            .iter()
            .map(|team| format!("{} ({})", team.name, team.slug))
            .collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Select a team")
            .items(&items)
            .default(0)
            .interact_opt()
            .context("team prompt")?;
        Ok(to_reply(selection).map(|idx| teams[idx].id.clone()))
    }

    fn choose_apps(&mut self, apps: &[App]) -> Result<Reply<Vec<usize>>> {
        let items: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        let selection = MultiSelect::with_theme(&self.theme)
            .with_prompt("Select apps to link (space toggles, enter confirms)")
            .items(&items)
            .interact_opt()
            .context("app prompt")?;
        Ok(to_reply(selection))
    }

    fn choose_link_mode(&mut self, app: &App) -> Result<Reply<LinkMode>> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(format!("How should {} be linked?", app.name))
            .items(&["Link to an existing project", "Create a new project"])
            .default(0)
            .interact_opt()
            .context("link mode prompt")?;
        Ok(to_reply(selection).map(|idx| {
            if idx == 0 {
                LinkMode::Existing
            } else {
                LinkMode::Create
            }
        }))
    }

    fn choose_project(&mut self, app: &App, projects: &[RemoteProject]) -> Result<Reply<String>> {
        let items: Vec<String> = projects
            .iter()
            .map(|project| match &project.framework {
                Some(framework) => format!("{} ({framework})", project.name),
                None => project.name.clone(),
            })
            .collect();
        let default = projects
            .iter()
            .position(|project| project.name == app.name)
            .unwrap_or(0);
        let selection = Select::with_theme(&self.theme)
            .with_prompt(format!("Project for {}", app.name))
            .items(&items)
            .default(default)
            .interact_opt()
            .context("project prompt")?;
        Ok(to_reply(selection).map(|idx| projects[idx].name.clone()))
    }

    fn project_name(&mut self, app: &App, default: &str) -> Result<Reply<String>> {
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("New project name for {}", app.name))
            .default(default.to_string())
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() {
                    Err("project name cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text();
        match answer {
            Ok(name) => Ok(Reply::Answered(name.trim().to_string())),
            Err(dialoguer::Error::IO(err)) if err.kind() == ErrorKind::Interrupted => {
                Ok(Reply::Cancelled)
            }
            Err(err) => Err(err).context("project name prompt"),
        }
    }
}

fn to_reply<T>(selection: Option<T>) -> Reply<T> {
    match selection {
        Some(value) => Reply::Answered(value),
        None => Reply::Cancelled,
    }
}

/// Line-oriented prompts for scripted use. End of input cancels.
///
/// Team and app answers use the same formats as [`select_team`] and
/// [`select_apps`]: a 1-based team number, and a comma-separated list of app
/// numbers to exclude.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `message` and read one trimmed line.
    pub fn ask(&mut self, message: &str) -> Result<Reply<String>> {
        write!(self.output, "{message}").context("write prompt")?;
        self.output.flush().context("flush prompt")?;
        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("read answer")?;
        if n == 0 {
            return Ok(Reply::Cancelled);
        }
        Ok(Reply::Answered(line.trim().to_string()))
    }

    fn list<I: IntoIterator<Item = String>>(&mut self, labels: I) -> Result<()> {
        for (idx, label) in labels.into_iter().enumerate() {
            writeln!(self.output, "  {}) {label}", idx + 1).context("write choices")?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose_team(&mut self, teams: &[Team]) -> Result<Reply<String>> {
        self.list(teams.iter().map(|t| format!("{} ({})", t.name, t.slug)))?;
        let reply = select_team(teams, |message| self.ask(message))?;
        Ok(reply.map(|team| team.id))
    }

    fn choose_apps(&mut self, apps: &[App]) -> Result<Reply<Vec<usize>>> {
        self.list(apps.iter().map(|app| app.name.clone()))?;
        let reply = select_apps(apps, |message| self.ask(message))?;
        Ok(reply.map(|kept| {
            apps.iter()
                .enumerate()
                .filter(|(_, app)| kept.contains(app))
                .map(|(idx, _)| idx)
                .collect()
        }))
    }

    fn choose_link_mode(&mut self, app: &App) -> Result<Reply<LinkMode>> {
        loop {
            let message = format!(
                "Link {} to an existing project or create a new one? [link/create]: ",
                app.name
            );
            let answer = match self.ask(&message)? {
                Reply::Answered(answer) => answer,
                Reply::Cancelled => return Ok(Reply::Cancelled),
            };
            match answer.to_lowercase().as_str() {
                "1" | "l" | "link" => return Ok(Reply::Answered(LinkMode::Existing)),
                "2" | "c" | "create" => return Ok(Reply::Answered(LinkMode::Create)),
                other => warn!(answer = other, "please answer 'link' or 'create'"),
            }
        }
    }

    fn choose_project(&mut self, app: &App, projects: &[RemoteProject]) -> Result<Reply<String>> {
        self.list(projects.iter().map(|p| p.name.clone()))?;
        loop {
            let message = format!(
                "Project for {} (1-{} or name): ",
                app.name,
                projects.len()
            );
            let answer = match self.ask(&message)? {
                Reply::Answered(answer) => answer,
                Reply::Cancelled => return Ok(Reply::Cancelled),
            };
            if let Some(project) = projects.iter().find(|p| p.name == answer) {
                return Ok(Reply::Answered(project.name.clone()));
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=projects.len()).contains(&n) => {
                    return Ok(Reply::Answered(projects[n - 1].name.clone()));
                }
                _ => warn!(
                    answer = %answer,
                    "invalid project, enter a number between 1 and {} or a project name",
                    projects.len()
                ),
            }
        }
    }

    fn project_name(&mut self, app: &App, _default: &str) -> Result<Reply<String>> {
        loop {
            let message = format!("New project name for {}: ", app.name);
            match self.ask(&message)? {
                Reply::Answered(name) if name.is_empty() => {
                    warn!("project name cannot be empty");
                }
                other => return Ok(other),
            }
        }
    }
}
