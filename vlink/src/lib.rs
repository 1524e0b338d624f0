//! Link the apps of a multi-app workspace to Vercel projects.
//!
//! The crate drives the `vercel` CLI through a fixed workflow: check login,
//! pick a team, pick apps, link or create one project per app, then keep each
//! app's `.env.production` / `.env.staging` / `.env.preview` in sync with the
//! URLs of the app and its backend sibling.
//!
//! - **[`core`]**: Pure, deterministic logic (table/JSON parsing, URL formulas,
//!   env-file merge). No I/O.
//! - **[`io`]**: Side-effecting operations (config, processes, prompts, env
//!   files). Isolated behind traits so tests can script them.
//!
//! Orchestration modules ([`link`], [`apps`], [`teams`], [`projects`],
//! [`sync`]) coordinate core logic with I/O to implement CLI commands.

pub mod apps;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod link;
pub mod logging;
pub mod projects;
pub mod sync;
pub mod teams;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
