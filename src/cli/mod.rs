//! CLI module for liftlog.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `display`: Output formatting and display logic

pub mod client;
pub mod commands;
pub mod display;

use anyhow::{Context, Result};

use crate::analysis::{analyze_sessions, analyze_templates, MuscleMap, VolumeReport};
use crate::store::Database;

pub use client::{IpcClient, WatchStream};
pub use commands::{AnalyzeArgs, Cli, Commands, DaemonArgs, TimerAction};
pub use display::Display;

/// Loads the database named by `args` and computes the requested report.
///
/// Returns the report title with the report.
pub fn build_report(args: &AnalyzeArgs) -> Result<(String, VolumeReport)> {
    let db = Database::open(&args.database)
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;
    let lookup = MuscleMap::builtin().with_custom(&db.custom_exercises());
    let options = args.volume_options();

    if args.sessions {
        let sessions = db.session_views();
        let title = format!("Logged sessions ({})", sessions.len());
        return Ok((title, analyze_sessions(&sessions, &lookup, options)));
    }

    let mut templates = db.template_views();
    let title = match &args.template {
        Some(name) => {
            templates.retain(|view| view.template.name.eq_ignore_ascii_case(name.trim()));
            if templates.is_empty() {
                anyhow::bail!("No template named '{}'", name);
            }
            format!("Template: {}", templates[0].template.name)
        }
        None => format!("All templates ({})", templates.len()),
    };
    Ok((title, analyze_templates(&templates, &lookup, options)))
}
