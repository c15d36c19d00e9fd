//! Command definitions for the liftlog CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::analysis::VolumeOptions;
use crate::settings::MAX_REST_SECONDS;
use crate::types::IpcRequest;

// ============================================================================
// CLI Structure
// ============================================================================

/// Strength-training log with a background rest timer
#[derive(Parser, Debug)]
#[command(
    name = "liftlog",
    version,
    about = "Strength-training log with a background rest timer",
    long_about = "Plan and log strength training.\n\
                  The daemon keeps the rest timer running between sets; the other \
                  commands talk to it over a Unix socket.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (default: ~/.liftlog/liftlog.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the rest timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Control the rest timer
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Report effective sets per muscle from a saved database
    Analyze(AnalyzeArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Settings file (default: ~/.liftlog/settings.json)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Draw the rest indicator on this terminal instead of logging it
    #[arg(long)]
    pub console: bool,
}

/// Rest timer actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    /// Start a rest period (e.g. 90, 90s, 2m, 1m30s)
    Start {
        #[arg(value_parser = parse_rest_duration)]
        duration: u32,
    },

    /// Pause the running rest period
    Pause,

    /// Resume a paused rest period
    Resume,

    /// Cancel the rest period without the completion alert
    Skip,

    /// Add time to the rest period
    Add {
        #[arg(value_parser = parse_rest_duration)]
        duration: u32,
    },

    /// Remove time from the rest period
    Subtract {
        #[arg(value_parser = parse_rest_duration)]
        duration: u32,
    },

    /// Show the rest timer state
    Status,

    /// Follow the rest timer until interrupted
    Watch,
}

impl TimerAction {
    /// Request sent to the daemon for this action.
    pub fn to_request(&self) -> IpcRequest {
        match *self {
            TimerAction::Start { duration } => IpcRequest::Start { seconds: duration },
            TimerAction::Pause => IpcRequest::Pause,
            TimerAction::Resume => IpcRequest::Resume,
            TimerAction::Skip => IpcRequest::Skip,
            TimerAction::Add { duration } => IpcRequest::Add { seconds: duration },
            TimerAction::Subtract { duration } => IpcRequest::Subtract { seconds: duration },
            TimerAction::Status => IpcRequest::Status,
            TimerAction::Watch => IpcRequest::Watch,
        }
    }
}

// ============================================================================
// Analyze Command Arguments
// ============================================================================

/// Arguments for the analyze command
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Database snapshot written by liftlog
    pub database: PathBuf,

    /// Count warm-up sets
    #[arg(long)]
    pub include_warmup: bool,

    /// Count drop sets
    #[arg(long)]
    pub include_drop: bool,

    /// Analyze logged sessions instead of templates
    #[arg(long)]
    pub sessions: bool,

    /// Only analyze the template with this name
    #[arg(short, long, conflicts_with = "sessions")]
    pub template: Option<String>,
}

impl AnalyzeArgs {
    pub fn volume_options(&self) -> VolumeOptions {
        VolumeOptions {
            include_warmup: self.include_warmup,
            include_drop: self.include_drop,
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a rest duration.
///
/// Accepts plain seconds (`90`), or minutes and seconds with units (`90s`,
/// `2m`, `1m30s`). The result must lie in `1..=MAX_REST_SECONDS`.
pub fn parse_rest_duration(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration cannot be empty".to_string());
    }

    let total = if let Ok(secs) = s.parse::<u32>() {
        secs
    } else {
        parse_with_units(s).ok_or_else(|| format!("invalid duration '{}'", s))?
    };

    if total == 0 || total > MAX_REST_SECONDS {
        return Err(format!(
            "duration must be between 1 and {} seconds",
            MAX_REST_SECONDS
        ));
    }
    Ok(total)
}

fn parse_with_units(s: &str) -> Option<u32> {
    let (minutes, rest) = match s.split_once('m') {
        Some((m, rest)) => (m.parse::<u32>().ok()?, rest),
        None => (0, s),
    };
    let seconds = match rest {
        "" => 0,
        _ => rest.strip_suffix('s')?.parse::<u32>().ok()?,
    };
    minutes.checked_mul(60)?.checked_add(seconds)
}

// ============================================================================
// Tests
// ============================================================================
