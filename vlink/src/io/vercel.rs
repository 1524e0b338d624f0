//! Adapter for the deployment platform's command-line tool.
//!
//! The [`CommandRunner`] trait decouples the workflow from the actual `vercel`
//! binary. Tests use scripted runners that return canned output without
//! spawning processes.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::io::process::{run_attached, run_captured};

/// Substrings in the CLI's error output meaning "this flag is not supported".
pub const UNSUPPORTED_FLAG_MARKERS: [&str; 3] = [
    "unknown flag",
    "unknown or unexpected option",
    "unknown option",
];

/// The external command exited unsuccessfully.
#[derive(Debug, Clone, Error)]
#[error("`{command}` failed with exit code {code:?}: {stderr}")]
pub struct CommandFailed {
    pub command: String,
    pub code: Option<i32>,
    pub stderr: String,
}

/// One invocation of the CLI: arguments plus an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            workdir: None,
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.workdir = Some(dir.to_path_buf());
        self
    }

    pub fn with_args(mut self, extra: &[String]) -> Self {
        self.args.extend(extra.iter().cloned());
        self
    }

    /// Space-joined arguments, for logs and error messages.
    pub fn display(&self) -> String {
        self.args.join(" ")
    }
}

/// Output of a successful captured invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn stdout(text: &str) -> Self {
        Self {
            stdout: text.to_string(),
            stderr: String::new(),
        }
    }

    /// stdout followed by stderr. The CLI prints its tables on stderr.
    pub fn combined(&self) -> String {
        let mut buf = self.stdout.clone();
        if !buf.is_empty() && !buf.ends_with('\n') && !self.stderr.is_empty() {
            buf.push('\n');
        }
        buf.push_str(&self.stderr);
        buf
    }
}

/// Abstraction over the deployment CLI.
pub trait CommandRunner {
    /// Run and capture output. A non-zero exit is an error carrying [`CommandFailed`].
    fn capture(&self, invocation: &Invocation) -> Result<Captured>;

    /// Run attached to the terminal so the CLI can prompt the operator.
    fn attach(&self, invocation: &Invocation) -> Result<()>;
}

/// Runner that spawns the real CLI binary.
#[derive(Debug, Clone)]
pub struct VercelCli {
    program: String,
    output_limit_bytes: usize,
}

impl VercelCli {
    pub fn new(program: impl Into<String>, output_limit_bytes: usize) -> Self {
        Self {
            program: program.into(),
            output_limit_bytes,
        }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn label(&self, invocation: &Invocation) -> String {
        format!("{} {}", self.program, invocation.display())
    }
}

impl CommandRunner for VercelCli {
    #[instrument(skip_all, fields(args = %invocation.display()))]
    fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        let output = run_captured(self.command(invocation), self.output_limit_bytes)?;
        if !output.status.success() {
            return Err(CommandFailed {
                command: self.label(invocation),
                code: output.status.code(),
                stderr: output.stderr_lossy().trim().to_string(),
            }
            .into());
        }
        Ok(Captured {
            stdout: output.stdout_lossy(),
            stderr: output.stderr_lossy(),
        })
    }

    #[instrument(skip_all, fields(args = %invocation.display()))]
    fn attach(&self, invocation: &Invocation) -> Result<()> {
        info!(command = %self.label(invocation), "running");
        let status = run_attached(self.command(invocation))?;
        if !status.success() {
            return Err(CommandFailed {
                command: self.label(invocation),
                code: status.code(),
                stderr: String::new(),
            }
            .into());
        }
        Ok(())
    }
}

/// True if the error says the CLI rejected a flag it does not know.
///
/// This is the only condition that triggers the plain-text fallback.
pub fn is_unsupported_flag(err: &anyhow::Error) -> bool {
    let haystack = match err.downcast_ref::<CommandFailed>() {
        Some(failed) => failed.stderr.to_lowercase(),
        None => format!("{err:#}").to_lowercase(),
    };
    UNSUPPORTED_FLAG_MARKERS
        .iter()
        .any(|marker| haystack.contains(marker))
}

/// Output of a command that may or may not have honoured the JSON flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structured {
    Json(Captured),
    Text(Captured),
}

/// Run `invocation` asking for JSON; retry without the flag if the CLI rejects it.
///
/// Any other failure is returned unchanged.
pub fn capture_structured<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
    json_flag: &[String],
) -> Result<Structured> {
    if json_flag.is_empty() {
        return runner.capture(invocation).map(Structured::Text);
    }
    match runner.capture(&invocation.clone().with_args(json_flag)) {
        Ok(captured) => Ok(Structured::Json(captured)),
        Err(err) if is_unsupported_flag(&err) => {
            debug!(args = %invocation.display(), "json flag rejected, retrying as plain text");
            runner.capture(invocation).map(Structured::Text)
        }
        Err(err) => Err(err),
    }
}

/// Turn structured output into records.
///
/// JSON that fails to parse is read again as a plain-text table. Returns
/// `None` when the text has no recognisable header.
pub fn parse_listing<T>(
    output: &Structured,
    from_json: impl Fn(&str) -> Result<Vec<T>>,
    from_text: impl Fn(&str) -> Option<Vec<T>>,
) -> Option<Vec<T>> {
    match output {
        Structured::Json(captured) => match from_json(&captured.stdout) {
            Ok(records) => Some(records),
            Err(err) => {
                debug!(err = %err, "json listing did not parse, reading as text");
                from_text(&captured.combined())
            }
        },
        Structured::Text(captured) => from_text(&captured.combined()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn failed(stderr: &str) -> anyhow::Error {
        CommandFailed {
            command: "vercel teams ls".to_string(),
            code: Some(2),
            stderr: stderr.to_string(),
        }
        .into()
    }

    #[test]
    fn unsupported_flag_detection() {
        assert!(is_unsupported_flag(&failed("Error: unknown or unexpected option: --format")));
        assert!(is_unsupported_flag(&failed("Error: Unknown flag --json")));
        assert!(!is_unsupported_flag(&failed("Error: not authorized")));
        assert!(is_unsupported_flag(&anyhow!("unknown flag: --format")));
    }

    #[test]
    fn combined_joins_streams() {
        let captured = Captured {
            stdout: "a".to_string(),
            stderr: "b\n".to_string(),
        };
        assert_eq!(captured.combined(), "a\nb\n");
    }

    #[test]
    fn invocation_display_and_args() {
        let inv = Invocation::new(["teams", "ls"]).with_args(&["--format".to_string(), "json".to_string()]);
        assert_eq!(inv.display(), "teams ls --format json");
        assert!(inv.workdir.is_none());
    }
}
