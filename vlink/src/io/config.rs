//! Linker configuration stored in `vlink.toml` at the workspace root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, relative to the workspace root.
pub const CONFIG_FILE: &str = "vlink.toml";

/// Linker configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkerConfig {
    /// Deployment CLI program to invoke.
    pub cli: String,

    /// Directory (relative to the workspace root) holding one folder per app.
    pub apps_dir: PathBuf,

    /// App directory whose `APP_URL` becomes every other app's `API_URL`.
    pub backend_app: String,

    /// Domain suffix of generated deployment URLs.
    pub domain: String,

    /// Framework prefixes under which a managed key is also recognised.
    pub public_prefixes: Vec<String>,

    /// Arguments that ask the CLI for JSON output.
    pub json_flag: Vec<String>,

    /// Keep at most this many bytes of captured CLI output per stream.
    pub output_limit_bytes: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            cli: "vercel".to_string(),
            apps_dir: PathBuf::from("apps"),
            backend_app: "backend".to_string(),
            domain: "vercel.app".to_string(),
            public_prefixes: vec![
                "NEXT_PUBLIC_".to_string(),
                "VITE_".to_string(),
                "EXPO_PUBLIC_".to_string(),
            ],
            json_flag: vec!["--format".to_string(), "json".to_string()],
            output_limit_bytes: 1_000_000,
        }
    }
}

impl LinkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cli.trim().is_empty() {
            return Err(anyhow!("cli must not be empty"));
        }
        if self.apps_dir.as_os_str().is_empty() {
            return Err(anyhow!("apps_dir must not be empty"));
        }
        if self.domain.trim().is_empty() {
            return Err(anyhow!("domain must not be empty"));
        }
        if self.public_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(anyhow!("public_prefixes must not contain empty entries"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LinkerConfig::default()`.
pub fn load_config(path: &Path) -> Result<LinkerConfig> {
    if !path.exists() {
        let cfg = LinkerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LinkerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
