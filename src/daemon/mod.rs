//! Daemon hosting the rest timer.
//!
//! - `ipc`: Unix socket server and request handling
//!
//! The daemon owns the [`TimerService`] for its whole lifetime, attaches the
//! feedback adapter to it and serves each socket connection on its own task.

pub mod ipc;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::notification::Notifier;
use crate::settings::SettingsProvider;
use crate::sound::{try_create_player, SoundPlayer};
use crate::timer::{spawn_feedback, TimerFeedback, TimerService};
use crate::vibration::NoopVibrator;

pub use ipc::{default_socket_path, IpcError, IpcServer, RequestHandler};

/// Builds the feedback adapter with the backends available on this host.
///
/// Sound is skipped when no output device can be opened. Vibration is never
/// available on a desktop.
pub fn default_feedback(
    notifier: Arc<dyn Notifier>,
    settings: Arc<dyn SettingsProvider>,
) -> TimerFeedback {
    let sound = try_create_player().map(|player| player as Arc<dyn SoundPlayer>);
    if sound.is_none() {
        warn!("No audio output available, rest cues will be silent");
    }
    TimerFeedback::new(notifier, sound, Arc::new(NoopVibrator), settings)
}

/// Runs the daemon until Ctrl-C or SIGTERM.
pub async fn run(socket_path: &Path, feedback: TimerFeedback) -> Result<()> {
    let server = IpcServer::new(socket_path)?;
    let (timer, service) = TimerService::spawn();
    let feedback = spawn_feedback(&timer, feedback);
    let handler = RequestHandler::new(timer.clone());

    info!(socket = %server.socket_path().display(), "Daemon listening");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.serve(stream).await {
                            debug!("Connection ended with error: {:#}", e);
                        }
                    });
                }
                Err(e) => warn!("{:#}", e),
            },
            _ = &mut shutdown => {
                info!("Shutting down daemon");
                break;
            }
        }
    }

    timer.shutdown();
    let _ = service.await;
    let _ = feedback.await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}
