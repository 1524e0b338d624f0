//! Env sync for whole apps, on top of the per-file synchronizer.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use tracing::{info, warn};

use crate::apps::discover_apps;
use crate::core::types::App;
use crate::io::config::LinkerConfig;
use crate::io::env_files::{EnvFileUpdateResult, EnvSyncDeps, update_all_env_files};

/// Directory of the configured backend app among the discovered apps.
pub fn backend_dir(apps: &[App], cfg: &LinkerConfig) -> Option<PathBuf> {
    apps.iter()
        .find(|app| app.name == cfg.backend_app)
        .map(|app| app.path.clone())
}

/// Synchronize one app and log what happened to each tier file.
pub fn sync_app_env(
    app: &App,
    project: &str,
    team_slug: &str,
    deps: &EnvSyncDeps,
) -> Vec<EnvFileUpdateResult> {
    let results = update_all_env_files(&app.path, project, team_slug, deps);
    for result in &results {
        match &result.error {
            Some(err) => warn!(app = %app.name, tier = %result.tier, err = %err, "env file not updated"),
            None if result.updated => {
                info!(app = %app.name, file = %result.path.display(), "env file updated");
            }
            None => {}
        }
    }
    results
}

/// Fail if any tier file could not be written.
pub fn ensure_synced(results: &[EnvFileUpdateResult]) -> Result<()> {
    let failures: Vec<String> = results
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| format!("{}: {e}", r.tier)))
        .collect();
    if failures.is_empty() {
        return Ok(());
    }
    Err(anyhow!("env sync failed ({})", failures.join("; ")))
}

/// Synchronize a single named app outside the linking workflow.
pub fn sync_named_app(
    root: &Path,
    cfg: &LinkerConfig,
    app_name: &str,
    project: &str,
    team_slug: &str,
) -> Result<Vec<EnvFileUpdateResult>> {
    let apps = discover_apps(root, &cfg.apps_dir)?;
    let Some(app) = apps.iter().find(|app| app.name == app_name) else {
        bail!(
            "app {app_name} not found under {}",
            root.join(&cfg.apps_dir).display()
        );
    };
    let deps = EnvSyncDeps::from_config(cfg, backend_dir(&apps, cfg));
    Ok(sync_app_env(app, project, team_slug, &deps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EnvTier;
    use crate::test_support::TestWorkspace;

    #[test]
    fn named_app_uses_backend_sibling() {
        let ws = TestWorkspace::new(&["backend", "web"]).expect("workspace");
        ws.write_env("backend", EnvTier::Preview, "APP_URL=https://api-preview.example\n")
            .expect("write");

        let results =
            sync_named_app(ws.root(), &LinkerConfig::default(), "web", "web", "acme").expect("sync");
        assert_eq!(results.len(), 3);
        let preview = ws.read_env("web", EnvTier::Preview).expect("read");
        assert!(preview.contains("API_URL=https://api-preview.example\n"));
        assert!(preview.contains("APP_URL=https://web-acme.vercel.app\n"));
    }

    #[test]
    fn unknown_app_is_an_error() {
        let ws = TestWorkspace::new(&["web"]).expect("workspace");
        let err = sync_named_app(ws.root(), &LinkerConfig::default(), "ghost", "p", "t")
            .unwrap_err();
        assert!(err.to_string().contains("app ghost not found"));
    }

    #[test]
    fn ensure_synced_lists_failed_tiers() {
        let results = vec![EnvFileUpdateResult {
            path: PathBuf::from(".env.staging"),
            tier: EnvTier::Staging,
            updated: false,
            error: Some("permission denied".to_string()),
        }];
        let err = ensure_synced(&results).unwrap_err();
        assert_eq!(err.to_string(), "env sync failed (staging: permission denied)");
    }
}
