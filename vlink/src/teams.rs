//! Team discovery, selection and activation.

use anyhow::{Context, Result};
use tracing::{error, info, instrument, warn};

use crate::core::listing::{parse_teams_json, parse_teams_text};
use crate::core::types::{Reply, SelectionError, Team};
use crate::io::prompt::Prompter;
use crate::io::vercel::{CommandRunner, Invocation, capture_structured, parse_listing};

/// Fetch and parse `teams ls`.
///
/// Output without a recognisable header yields an empty list, not an error.
#[instrument(skip_all)]
pub fn fetch_vercel_teams<R: CommandRunner + ?Sized>(
    runner: &R,
    json_flag: &[String],
) -> Result<Vec<Team>> {
    let output = capture_structured(runner, &Invocation::new(["teams", "ls"]), json_flag)
        .inspect_err(|err| error!(err = %format!("{err:#}"), "failed to list teams"))
        .context("list teams")?;
    match parse_listing(&output, parse_teams_json, parse_teams_text) {
        Some(teams) => Ok(teams),
        None => {
            warn!("team table header not found in CLI output");
            Ok(Vec::new())
        }
    }
}

/// Programmatic selection: the answer is a 1-based team number.
///
/// Blank and invalid answers are warned about and asked again.
pub fn select_team<F>(teams: &[Team], mut prompt: F) -> Result<Reply<Team>>
where
    F: FnMut(&str) -> Result<Reply<String>>,
{
    if teams.is_empty() {
        return Err(SelectionError::NoTeams.into());
    }
    if teams.len() == 1 {
        info!(team = %teams[0].slug, "only one team found, selecting it");
        return Ok(Reply::Answered(teams[0].clone()));
    }
    let message = format!("Select a team (1-{}): ", teams.len());
    loop {
        let answer = match prompt(&message)? {
            Reply::Answered(answer) => answer,
            Reply::Cancelled => return Ok(Reply::Cancelled),
        };
        if answer.is_empty() {
            warn!("please enter a team number");
            continue;
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=teams.len()).contains(&n) => {
                return Ok(Reply::Answered(teams[n - 1].clone()));
            }
            _ => warn!(
                answer = %answer,
                "invalid team number, enter a number between 1 and {}",
                teams.len()
            ),
        }
    }
}

/// Interactive selection. A single team is selected without asking.
pub fn select_team_interactive<P: Prompter + ?Sized>(
    teams: &[Team],
    prompter: &mut P,
) -> Result<Reply<Team>> {
    if teams.is_empty() {
        return Err(SelectionError::NoTeams.into());
    }
    if teams.len() == 1 {
        info!(team = %teams[0].slug, "only one team found, selecting it");
        return Ok(Reply::Answered(teams[0].clone()));
    }
    let id = match prompter.choose_team(teams)? {
        Reply::Answered(id) => id,
        Reply::Cancelled => return Ok(Reply::Cancelled),
    };
    let team = teams
        .iter()
        .find(|team| team.id == id)
        .cloned()
        .ok_or(SelectionError::TeamNotFound(id))?;
    Ok(Reply::Answered(team))
}

/// Make `slug` the CLI's active team.
#[instrument(skip(runner))]
pub fn switch_to_team<R: CommandRunner + ?Sized>(slug: &str, runner: &R) -> Result<()> {
    runner
        .capture(&Invocation::new(["switch", slug, "--no-color"]))
        .inspect_err(|err| error!(team = slug, err = %format!("{err:#}"), "failed to switch team"))
        .with_context(|| format!("switch to team {slug}"))?;
    info!(team = slug, "switched team");
    Ok(())
}
