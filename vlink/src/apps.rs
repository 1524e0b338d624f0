//! App discovery and selection.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::core::types::{App, Reply, SelectionError};
use crate::io::prompt::Prompter;

/// List the app directories under `root/apps_dir`, sorted by name.
pub fn discover_apps(root: &Path, apps_dir: &Path) -> Result<Vec<App>> {
    let dir = root.join(apps_dir);
    let entries = fs::read_dir(&dir)
        .inspect_err(|err| error!(dir = %dir.display(), err = %err, "failed to read apps directory"))
        .with_context(|| format!("read apps directory {}", dir.display()))?;

    let mut apps = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        apps.push(App {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }
    apps.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(apps)
}

/// Programmatic selection: the answer lists 1-based app numbers to exclude.
///
/// An empty answer keeps every app. Tokens that are not valid numbers are
/// skipped with a warning.
pub fn select_apps<F>(apps: &[App], mut prompt: F) -> Result<Reply<Vec<App>>>
where
    F: FnMut(&str) -> Result<Reply<String>>,
{
    if apps.is_empty() {
        return Err(SelectionError::NoApps.into());
    }
    let answer = match prompt(
        "Enter app numbers to exclude (comma-separated), or press Enter to keep all: ",
    )? {
        Reply::Answered(answer) => answer,
        Reply::Cancelled => return Ok(Reply::Cancelled),
    };

    let mut excluded = BTreeSet::new();
    for token in answer.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<usize>() {
            Ok(n) if (1..=apps.len()).contains(&n) => {
                excluded.insert(n - 1);
            }
            _ => warn!(token, "ignoring invalid app number"),
        }
    }

    let kept: Vec<App> = apps
        .iter()
        .enumerate()
        .filter(|(idx, _)| !excluded.contains(idx))
        .map(|(_, app)| app.clone())
        .collect();
    if kept.is_empty() {
        return Err(SelectionError::NoAppsSelected.into());
    }
    Ok(Reply::Answered(kept))
}

/// Interactive selection.
///
/// A single app is selected without asking. An empty multi-selection falls
/// back to every app.
/// Indices that name no app are dropped; if nothing is left the selection
/// fails like an all-excluding answer to [`select_apps`].
pub fn select_apps_interactive<P: Prompter + ?Sized>(
    apps: &[App],
    prompter: &mut P,
) -> Result<Reply<Vec<App>>> {
    if apps.is_empty() {
        return Err(SelectionError::NoApps.into());
    }
    if apps.len() == 1 {
        info!(app = %apps[0].name, "only one app found, selecting it");
        return Ok(Reply::Answered(apps.to_vec()));
    }
    let indices = match prompter.choose_apps(apps)? {
        Reply::Answered(indices) => indices,
        Reply::Cancelled => return Ok(Reply::Cancelled),
    };
    if indices.is_empty() {
        info!("no apps selected, using all apps");
        return Ok(Reply::Answered(apps.to_vec()));
    }
    let selected = indices
        .into_iter()
        .filter_map(|idx| apps.get(idx).cloned())
        .collect::<Vec<_>>();
    if selected.is_empty() {
        return Err(SelectionError::NoAppsSelected.into());
    }
    Ok(Reply::Answered(selected))
}
