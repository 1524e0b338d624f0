//! Shared types for the linking workflow.
//!
//! These are plain data records produced by discovery and parsing. They carry
//! no I/O handles and are cheap to clone.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A workspace sub-project under `apps/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct App {
    /// Absolute location of the app directory.
    pub path: PathBuf,
    /// Directory name, also used as the display label.
    pub name: String,
}

/// A remote organization the deployment platform can operate under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    /// Routing identifier passed to `switch` and `--scope`.
    pub slug: String,
    pub name: String,
}

/// A deployment-platform project visible under the active team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteProject {
    pub name: String,
    /// Informational only; absent in plain-text listings.
    pub framework: Option<String>,
}

/// Deployment tier with its own env file and URL convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvTier {
    Production,
    Staging,
    Preview,
}

impl EnvTier {
    /// Every tier, in synchronization order.
    pub const ALL: [EnvTier; 3] = [EnvTier::Production, EnvTier::Staging, EnvTier::Preview];

    pub fn as_str(self) -> &'static str {
        match self {
            EnvTier::Production => "production",
            EnvTier::Staging => "staging",
            EnvTier::Preview => "preview",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            EnvTier::Production => ".env.production",
            EnvTier::Staging => ".env.staging",
            EnvTier::Preview => ".env.preview",
        }
    }
}

impl fmt::Display for EnvTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single app gets its remote project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Attach to a project that already exists under the team.
    Existing,
    /// Create a new project, then attach to it.
    Create,
}

/// Answer to an operator prompt.
///
/// Cancellation is a value, not an error: every call site decides what an
/// abort means at that point of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Answered(T),
    Cancelled,
}

impl<T> Reply<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reply<U> {
        match self {
            Reply::Answered(value) => Reply::Answered(f(value)),
            Reply::Cancelled => Reply::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Reply::Cancelled)
    }
}

/// Selection cannot proceed with the data at hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no app directories found")]
    NoApps,
    #[error("no apps selected")]
    NoAppsSelected,
    #[error("no teams available")]
    NoTeams,
    #[error("selected team not found: {0}")]
    TeamNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_file_names_are_fixed() {
        let names: Vec<&str> = EnvTier::ALL.iter().map(|tier| tier.file_name()).collect();
        assert_eq!(names, vec![".env.production", ".env.staging", ".env.preview"]);
    }

    #[test]
    fn reply_map_keeps_cancellation() {
        let cancelled: Reply<u32> = Reply::Cancelled;
        assert!(cancelled.map(|n| n + 1).is_cancelled());
        assert_eq!(Reply::Answered(1).map(|n| n + 1), Reply::Answered(2));
    }
}
