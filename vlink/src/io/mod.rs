//! I/O helpers for vlink commands.

pub mod config;
pub mod env_files;
pub mod process;
pub mod prompt;
pub mod vercel;
