//! `vlink`: link workspace apps to Vercel projects and keep their env files in sync.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vlink::exit_codes;
use vlink::io::config::{CONFIG_FILE, LinkerConfig, load_config};
use vlink::io::prompt::{DialoguerPrompter, LinePrompter, Prompter};
use vlink::io::vercel::VercelCli;
use vlink::link::{RunStatus, run_link};
use vlink::logging;

#[derive(Parser)]
#[command(
    name = "vlink",
    version,
    about = "Link monorepo apps to Vercel projects and sync their env files"
)]
struct Cli {
    /// Workspace root containing the apps directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file (default: `<root>/vlink.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Deployment CLI program (overrides config).
    #[arg(long, global = true)]
    cli: Option<String>,

    /// Backend app directory name (overrides config).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full workflow: team, apps, link or create projects, env sync.
    Link {
        /// Read answers line by line from stdin instead of terminal menus.
        #[arg(long)]
        non_interactive: bool,
    },
    /// List teams as `slug<TAB>name`.
    Teams,
    /// List project names of the active team.
    Projects,
    /// List app directories in processing order.
    Apps,
    /// Sync one app's env files without touching the CLI.
    Env {
        /// App directory name.
        app: String,
        /// Project the app is linked to.
        #[arg(long)]
        project: String,
        /// Team slug used in generated URLs.
        #[arg(long)]
        team: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILED);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let cfg = resolve_config(&cli)?;
    let runner = VercelCli::new(cfg.cli.clone(), cfg.output_limit_bytes);
    match cli.command {
        Command::Link { non_interactive } => cmd_link(&cli.root, &cfg, &runner, non_interactive),
        Command::Teams => {
            let teams = vlink::teams::fetch_vercel_teams(&runner, &cfg.json_flag)?;
            for team in &teams {
                println!("{}\t{}", team.slug, team.name);
            }
            Ok(exit_codes::OK)
        }
        Command::Projects => {
            let projects = vlink::projects::fetch_remote_projects(&runner, &cfg.json_flag)?;
            for project in &projects {
                println!("{}", project.name);
            }
            Ok(exit_codes::OK)
        }
        Command::Apps => {
            let apps = vlink::apps::discover_apps(&cli.root, &cfg.apps_dir)?;
            if apps.is_empty() {
                return Ok(exit_codes::NOTHING_TO_DO);
            }
            for app in &apps {
                println!("{}", app.name);
            }
            Ok(exit_codes::OK)
        }
        Command::Env { app, project, team } => cmd_env(&cli.root, &cfg, &app, &project, &team),
    }
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<LinkerConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join(CONFIG_FILE));
    let mut cfg = load_config(&path)?;
    if let Some(program) = &cli.cli {
        cfg.cli = program.clone();
    }
    if let Some(backend) = &cli.backend {
        cfg.backend_app = backend.clone();
    }
    cfg.validate().context("invalid command-line overrides")?;
    Ok(cfg)
}

fn cmd_link(root: &Path, cfg: &LinkerConfig, runner: &VercelCli, non_interactive: bool) -> Result<i32> {
    let stdin = io::stdin();
    let outcome = if non_interactive || !stdin.is_terminal() {
        let mut prompter = LinePrompter::new(stdin.lock(), io::stderr());
        link_with(root, cfg, runner, &mut prompter)?
    } else {
        let mut prompter = DialoguerPrompter::new();
        link_with(root, cfg, runner, &mut prompter)?
    };
    if outcome == RunStatus::Cancelled {
        eprintln!("Operation cancelled.");
    }
    Ok(outcome.exit_code())
}

fn link_with<P: Prompter>(
    root: &Path,
    cfg: &LinkerConfig,
    runner: &VercelCli,
    prompter: &mut P,
) -> Result<RunStatus> {
    let outcome = run_link(root, cfg, runner, prompter)?;
    for report in outcome.skipped() {
        eprintln!(
            "skipped {}: {}",
            report.app,
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(outcome.status)
}

fn cmd_env(root: &Path, cfg: &LinkerConfig, app: &str, project: &str, team: &str) -> Result<i32> {
    let results = vlink::sync::sync_named_app(root, cfg, app, project, team)?;
    for result in &results {
        let state = match (&result.error, result.updated) {
            (Some(err), _) => format!("error: {err}"),
            (None, true) => "updated".to_string(),
            (None, false) => "unchanged".to_string(),
        };
        println!("{}\t{state}", result.tier);
    }
    vlink::sync::ensure_synced(&results)?;
    Ok(exit_codes::OK)
}
