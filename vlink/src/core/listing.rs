//! Typed records from `teams ls` / `projects ls` output.
//!
//! Both listings come in two shapes: a plain-text table, and JSON whose field
//! names vary between CLI releases (`id` vs `ID`, `name` vs `Name`). JSON is
//! normalized through a short ordered alias list per logical field.

use anyhow::{Result, anyhow};
use serde_json::{Map, Value};

use crate::core::table::parse_table;
use crate::core::types::{RemoteProject, Team};

/// Header labels of the team table.
pub const TEAM_HEADER: [&str; 2] = ["id", "Team name"];

/// Accepted header label sets of the project table, newest CLI first.
pub const PROJECT_HEADERS: [&[&str]; 2] = [&["Project Name"], &["name", "updated"]];

const TEAMS_KEYS: [&str; 2] = ["teams", "Teams"];
const PROJECTS_KEYS: [&str; 2] = ["projects", "Projects"];
const ID_KEYS: [&str; 3] = ["id", "ID", "Id"];
const SLUG_KEYS: [&str; 2] = ["slug", "Slug"];
const NAME_KEYS: [&str; 2] = ["name", "Name"];
const FRAMEWORK_KEYS: [&str; 2] = ["framework", "Framework"];

/// Parse the plain-text team table.
///
/// Returns `None` when the header row never appears.
pub fn parse_teams_text(text: &str) -> Option<Vec<Team>> {
    let rows = parse_table(text, &TEAM_HEADER)?;
    let teams = rows
        .into_iter()
        .map(|columns| {
            let id = columns[0].to_string();
            let name = if columns.len() > 1 {
                columns[1..].join(" ")
            } else {
                id.clone()
            };
            Team {
                slug: id.clone(),
                id,
                name,
            }
        })
        .collect();
    Some(teams)
}

/// Parse the plain-text project table.
///
/// Returns `None` when none of the known header rows appear.
pub fn parse_projects_text(text: &str) -> Option<Vec<RemoteProject>> {
    let rows = PROJECT_HEADERS
        .iter()
        .find_map(|labels| parse_table(text, labels))?;
    let projects = rows
        .into_iter()
        .map(|columns| RemoteProject {
            name: columns[0].to_string(),
            framework: None,
        })
        .collect();
    Some(projects)
}

/// Parse a JSON team listing (`{"teams": [...]}` or a bare array).
pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let entries = entries(&value, &TEAMS_KEYS)?;
    let mut teams = Vec::with_capacity(entries.len());
    for entry in entries {
        let record = entry
            .as_object()
            .ok_or_else(|| anyhow!("team entry is not an object"))?;
        let id = field(record, &ID_KEYS)
            .or_else(|| field(record, &SLUG_KEYS))
            .ok_or_else(|| anyhow!("team entry has no id"))?;
        let slug = field(record, &SLUG_KEYS).unwrap_or_else(|| id.clone());
        let name = field(record, &NAME_KEYS).unwrap_or_else(|| slug.clone());
        teams.push(Team { id, slug, name });
    }
    Ok(teams)
}

/// Parse a JSON project listing (`{"projects": [...]}` or a bare array).
pub fn parse_projects_json(raw: &str) -> Result<Vec<RemoteProject>> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let entries = entries(&value, &PROJECTS_KEYS)?;
    let mut projects = Vec::with_capacity(entries.len());
    for entry in entries {
        let record = entry
            .as_object()
            .ok_or_else(|| anyhow!("project entry is not an object"))?;
        let name = field(record, &NAME_KEYS).ok_or_else(|| anyhow!("project entry has no name"))?;
        projects.push(RemoteProject {
            name,
            framework: field(record, &FRAMEWORK_KEYS),
        });
    }
    Ok(projects)
}

fn entries<'a>(value: &'a Value, keys: &[&str]) -> Result<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or_else(|| anyhow!("expected one of {keys:?} to hold an array")),
        _ => Err(anyhow!("unexpected JSON listing shape")),
    }
}

/// First non-empty string value under any of the aliases.
fn field(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
