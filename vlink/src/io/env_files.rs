//! Per-tier env file synchronization for one app.
//!
//! Each call recomputes the managed URLs, merges them into the app's
//! `.env.<tier>` files and writes only the files whose text changed. Failures
//! stay inside the result of the file they belong to.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::core::env_merge::{APP_URL, ManagedValues, merge_env, read_env_value, tier_app_url};
use crate::core::types::EnvTier;
use crate::io::config::LinkerConfig;

/// Outcome for one tier file of one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvFileUpdateResult {
    pub path: PathBuf,
    pub tier: EnvTier,
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything the synchronizer needs besides the app itself.
#[derive(Debug, Clone)]
pub struct EnvSyncDeps {
    /// Directory of the backend sibling, if known.
    pub backend_dir: Option<PathBuf>,
    pub domain: String,
    pub public_prefixes: Vec<String>,
}

impl EnvSyncDeps {
    pub fn from_config(cfg: &LinkerConfig, backend_dir: Option<PathBuf>) -> Self {
        Self {
            backend_dir,
            domain: cfg.domain.clone(),
            public_prefixes: cfg.public_prefixes.clone(),
        }
    }
}

/// Synchronize `.env.production`, `.env.staging` and `.env.preview` of one app.
///
/// Always returns one result per tier, in tier order.
#[instrument(skip_all, fields(app = %app_path.display(), project = project_name, team = team_slug))]
pub fn update_all_env_files(
    app_path: &Path,
    project_name: &str,
    team_slug: &str,
    deps: &EnvSyncDeps,
) -> Vec<EnvFileUpdateResult> {
    let backend_dir = deps
        .backend_dir
        .as_deref()
        .filter(|dir| *dir != app_path);

    EnvTier::ALL
        .iter()
        .map(|&tier| {
            let path = app_path.join(tier.file_name());
            let app_url = tier_app_url(tier, project_name, team_slug, &deps.domain);
            let api_url =
                backend_dir.and_then(|dir| backend_app_url(dir, tier, &deps.public_prefixes));
            let values = ManagedValues::new(app_url, api_url);
            match sync_file(&path, &values, &deps.public_prefixes) {
                Ok(updated) => {
                    debug!(tier = %tier, updated, "env file synchronized");
                    EnvFileUpdateResult {
                        path,
                        tier,
                        updated,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(tier = %tier, path = %path.display(), err = %format!("{err:#}"), "env file update failed");
                    EnvFileUpdateResult {
                        path,
                        tier,
                        updated: false,
                        error: Some(format!("{err:#}")),
                    }
                }
            }
        })
        .collect()
}

/// The backend's `APP_URL` for `tier`, or `None` if it cannot be read.
pub fn backend_app_url(backend_dir: &Path, tier: EnvTier, prefixes: &[String]) -> Option<String> {
    let path = backend_dir.join(tier.file_name());
    match fs::read_to_string(&path) {
        Ok(contents) => read_env_value(&contents, APP_URL, prefixes),
        Err(err) => {
            debug!(path = %path.display(), err = %err, "backend env file unavailable");
            None
        }
    }
}

/// Merge into one file. Returns whether the file was written.
fn sync_file(path: &Path, values: &ManagedValues, prefixes: &[String]) -> Result<bool> {
    let original = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let merged = merge_env(&original, &values.pairs(), prefixes);
    if merged == original {
        return Ok(false);
    }
    write_atomic(path, &merged)?;
    Ok(true)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("env path missing file name {}", path.display()))?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp env file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace env file {}", path.display()))?;
    Ok(())
}
