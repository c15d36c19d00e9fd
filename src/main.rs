//! liftlog - strength-training log with a background rest timer
//!
//! The daemon hosts the rest timer so it keeps counting while nothing else
//! is open; the other commands drive it over a Unix socket or read a saved
//! database.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use liftlog::cli::{build_report, Cli, Commands, DaemonArgs, Display, IpcClient, TimerAction};
use liftlog::daemon::{self, default_socket_path};
use liftlog::notification::{ConsoleNotifier, LogNotifier, Notifier};
use liftlog::settings::{FileSettings, SettingsProvider, StaticSettings};
use liftlog::types::TimerPhase;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `warn`, or `info` with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Daemon(args)) => run_daemon(cli.socket, args).await?,
        Some(Commands::Timer { action }) => {
            let client = IpcClient::for_socket(cli.socket)?;
            run_timer(&client, action).await?;
        }
        Some(Commands::Analyze(args)) => {
            let (title, report) = build_report(&args)?;
            Display::show_report(&title, &report);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

async fn run_daemon(socket: Option<PathBuf>, args: DaemonArgs) -> Result<()> {
    let socket_path = match socket {
        Some(path) => path,
        None => default_socket_path().context("Cannot locate the home directory for the socket")?,
    };

    let settings: Arc<dyn SettingsProvider> = match args.settings {
        Some(path) => Arc::new(FileSettings::new(path)),
        None => match FileSettings::from_default_location() {
            Some(settings) => Arc::new(settings),
            None => {
                tracing::warn!("No home directory, using default settings");
                Arc::new(StaticSettings::default())
            }
        },
    };

    let notifier: Arc<dyn Notifier> = if args.console {
        Arc::new(ConsoleNotifier::new())
    } else {
        Arc::new(LogNotifier)
    };

    daemon::run(&socket_path, daemon::default_feedback(notifier, settings)).await
}

async fn run_timer(client: &IpcClient, action: TimerAction) -> Result<()> {
    match action {
        TimerAction::Status => {
            let response = client.status().await?;
            Display::show_status(&response);
        }
        TimerAction::Watch => {
            let (ack, mut stream) = client.watch().await?;
            Display::show_status(&ack);

            let mut last_shown: Option<(TimerPhase, u32, bool)> = None;
            while let Some(event) = stream.next().await? {
                let key = (event.phase(), event.remaining_seconds, event.is_complete);
                if last_shown != Some(key) {
                    Display::show_event(&event);
                    last_shown = Some(key);
                }
            }
        }
        action => {
            let response = client.request(&action.to_request()).await?;
            Display::show_command_success(&response);
        }
    }
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
