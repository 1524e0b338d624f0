//! Remote project discovery, creation and linking.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::listing::{parse_projects_json, parse_projects_text};
use crate::core::types::{App, RemoteProject};
use crate::io::vercel::{CommandRunner, Invocation, capture_structured, parse_listing};

/// Fetch and parse `projects ls` for the active team.
#[instrument(skip_all)]
pub fn fetch_remote_projects<R: CommandRunner + ?Sized>(
    runner: &R,
    json_flag: &[String],
) -> Result<Vec<RemoteProject>> {
    let output = capture_structured(runner, &Invocation::new(["projects", "ls"]), json_flag)
        .context("list projects")?;
    let projects = parse_listing(&output, parse_projects_json, parse_projects_text)
        .unwrap_or_else(|| {
            debug!("project table header not found, assuming no projects");
            Vec::new()
        });
    debug!(count = projects.len(), "remote projects loaded");
    Ok(projects)
}

/// Attach `app` to an existing project. Runs attached to the terminal.
#[instrument(skip(runner, app), fields(app = %app.name))]
pub fn link_project<R: CommandRunner + ?Sized>(
    runner: &R,
    app: &App,
    project: &str,
    team_slug: &str,
) -> Result<()> {
    let invocation = Invocation::new(["link", "--yes", "--project", project, "--scope", team_slug])
        .in_dir(&app.path);
    runner
        .attach(&invocation)
        .with_context(|| format!("link {} to project {project}", app.name))?;
    info!(app = %app.name, project, "linked");
    Ok(())
}

/// Create a new project under the team.
#[instrument(skip(runner))]
pub fn create_project<R: CommandRunner + ?Sized>(
    runner: &R,
    name: &str,
    team_slug: &str,
) -> Result<()> {
    runner
        .capture(&Invocation::new(["project", "add", name, "--scope", team_slug]))
        .with_context(|| format!("create project {name}"))?;
    info!(project = name, team = team_slug, "project created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::vercel::Captured;
    use crate::test_support::{ScriptedRunner, app};

    #[test]
    fn fetch_reads_text_listing_after_fallback() {
        let runner = ScriptedRunner::new()
            .on_fail("projects ls --format json", "Error: unknown flag --format")
            .on_ok(
                "projects ls",
                Captured {
                    stdout: String::new(),
                    stderr: "  Project Name   Latest Production URL   Updated\n  web   https://web.vercel.app   1d\n".to_string(),
                },
            );
        let projects =
            fetch_remote_projects(&runner, &["--format".to_string(), "json".to_string()])
                .expect("fetch");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "web");
    }

    #[test]
    fn fetch_without_table_is_empty() {
        let runner = ScriptedRunner::new()
            .on_ok("projects ls", Captured::stdout("> No projects found under acme\n"));
        assert!(fetch_remote_projects(&runner, &[]).expect("fetch").is_empty());
    }

    #[test]
    fn link_runs_in_app_directory() {
        let runner = ScriptedRunner::new();
        let web = app("web");
        link_project(&runner, &web, "web-prod", "acme").expect("link");
        let invocations = runner.invocations();
        assert_eq!(
            invocations[0].display(),
            "link --yes --project web-prod --scope acme"
        );
        assert_eq!(invocations[0].workdir.as_deref(), Some(web.path.as_path()));
    }

    #[test]
    fn create_failure_names_project() {
        let runner =
            ScriptedRunner::new().on_fail("project add taken --scope acme", "Error: name taken");
        let err = create_project(&runner, "taken", "acme").unwrap_err();
        assert!(err.to_string().contains("create project taken"));
    }
}
