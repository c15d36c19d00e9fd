//! Display utilities for the liftlog CLI.
//!
//! This module provides formatted output for:
//! - Timer command results and status
//! - Watch stream lines
//! - Volume reports
//! - Error messages

use std::fmt::Write as _;

use crate::analysis::VolumeReport;
use crate::notification::format_time;
use crate::types::{IpcResponse, TimerPhase, TimerUpdateEvent};

/// Width of the muscle name column in reports.
const NAME_WIDTH: usize = 12;

const RULE: &str = "─────────────────────────────";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the outcome of a timer command.
    pub fn show_command_success(response: &IpcResponse) {
        println!("* {}", response.message);
        if let Some(line) = Self::format_remaining(response) {
            println!("  {}", line);
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        print!("{}", Self::format_status(response));
    }

    /// Shows one watch stream update.
    pub fn show_event(event: &TimerUpdateEvent) {
        println!("{}", Self::format_event(event));
    }

    /// Shows a volume report.
    pub fn show_report(title: &str, report: &VolumeReport) {
        print!("{}", Self::format_report(title, report));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn format_remaining(response: &IpcResponse) -> Option<String> {
        let data = response.data.as_ref()?;
        if data.state.as_deref() == Some(TimerPhase::Idle.as_str()) {
            return None;
        }
        let remaining = data.remaining_seconds?;
        Some(match data.total_seconds {
            Some(total) => format!("{} of {} left", format_time(remaining), format_time(total)),
            None => format!("{} left", format_time(remaining)),
        })
    }

    pub(crate) fn format_status(response: &IpcResponse) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Rest timer");
        let _ = writeln!(out, "{}", RULE);

        let Some(data) = &response.data else {
            let _ = writeln!(out, "No rest timer data");
            return out;
        };

        let state = data.state.as_deref().unwrap_or("unknown");
        let state_display = match state {
            "idle" => "Idle",
            "running" => "Resting",
            "paused" => "Paused",
            other => other,
        };
        let _ = writeln!(out, "State: {}", state_display);
        if let Some(line) = Self::format_remaining(response) {
            let _ = writeln!(out, "{}", line);
        }
        out
    }

    pub(crate) fn format_event(event: &TimerUpdateEvent) -> String {
        if event.is_complete {
            return "Rest complete! Time for your next set".to_string();
        }
        match event.phase() {
            TimerPhase::Running => format!(
                "{} / {}",
                format_time(event.remaining_seconds),
                format_time(event.total_seconds)
            ),
            TimerPhase::Paused => format!("{} (paused)", format_time(event.remaining_seconds)),
            TimerPhase::Idle => "Rest skipped".to_string(),
        }
    }

    pub(crate) fn format_report(title: &str, report: &VolumeReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(
            out,
            "warm-up sets {}, drop sets {}",
            Self::included(report.options.include_warmup),
            Self::included(report.options.include_drop)
        );
        let _ = writeln!(out, "{}", RULE);

        let ranked = report.ranked();
        if ranked.is_empty() {
            let _ = writeln!(out, "No counted sets");
        }
        for (muscle, sets) in ranked {
            let volume = report.get(muscle);
            let _ = writeln!(
                out,
                "{:<width$} {:>5.1}  (primary {}, auxiliary {})",
                muscle.name(),
                sets,
                volume.primary.counted(report.options),
                volume.auxiliary.counted(report.options),
                width = NAME_WIDTH
            );
        }

        if !report.unmapped.is_empty() {
            let names: Vec<&str> = report.unmapped.iter().map(String::as_str).collect();
            let _ = writeln!(out);
            let _ = writeln!(out, "Unmapped exercises: {}", names.join(", "));
        }
        out
    }

    fn included(flag: bool) -> &'static str {
        if flag {
            "included"
        } else {
            "excluded"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
