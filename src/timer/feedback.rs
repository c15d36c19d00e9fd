//! Turns timer updates into notifications, sound and vibration.
//!
//! The adapter is just another listener on the relay. It never talks back to
//! the service, and every backend failure stops at this boundary.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::notification::{
    complete_content, paused_content, progress_content, NotificationContent, Notifier,
    PROGRESS_NOTIFICATION_ID,
};
use crate::settings::{Settings, SettingsProvider};
use crate::sound::{sound_for, SoundPlayer};
use crate::types::{TimerPhase, TimerUpdateEvent};
use crate::vibration::{VibrationPattern, Vibrator};

use super::client::{RestTimer, Subscription};
use super::relay::ListenerId;

/// Listener id reserved for the feedback adapter.
pub const FEEDBACK_LISTENER: ListenerId = ListenerId::new(0);

/// Side-effect adapter for timer updates.
pub struct TimerFeedback {
    notifier: Arc<dyn Notifier>,
    sound: Option<Arc<dyn SoundPlayer>>,
    vibrator: Arc<dyn Vibrator>,
    settings: Arc<dyn SettingsProvider>,
    /// Phase and second currently on the indicator.
    shown: Option<(TimerPhase, u32)>,
}

impl TimerFeedback {
    /// Creates an adapter. `sound` is `None` when no audio device exists.
    pub fn new(
        notifier: Arc<dyn Notifier>,
        sound: Option<Arc<dyn SoundPlayer>>,
        vibrator: Arc<dyn Vibrator>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            notifier,
            sound,
            vibrator,
            settings,
            shown: None,
        }
    }

    /// Applies one update, reading settings on the calling thread.
    pub fn handle(&mut self, event: &TimerUpdateEvent) {
        if event.is_complete {
            let settings = self.settings.settings();
            self.on_complete(&settings);
        } else {
            self.on_update(event);
        }
    }

    /// Consumes updates until the stream ends.
    ///
    /// Settings lookups may touch the filesystem, so they run on the
    /// blocking pool.
    pub async fn run(mut self, mut subscription: Subscription) {
        debug!(listener = %subscription.id(), "Timer feedback attached");
        while let Some(event) = subscription.recv().await {
            if event.is_complete {
                let settings = self.load_settings().await;
                self.on_complete(&settings);
            } else {
                self.on_update(&event);
            }
        }
        self.clear_indicator();
        debug!("Timer feedback detached");
    }

    async fn load_settings(&self) -> Settings {
        let provider = Arc::clone(&self.settings);
        match tokio::task::spawn_blocking(move || provider.settings()).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Settings lookup failed, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    fn on_update(&mut self, event: &TimerUpdateEvent) {
        match event.phase() {
            TimerPhase::Running => {
                self.show_indicator(TimerPhase::Running, event, progress_content)
            }
            TimerPhase::Paused => self.show_indicator(TimerPhase::Paused, event, paused_content),
            TimerPhase::Idle => self.clear_indicator(),
        }
    }

    fn show_indicator(
        &mut self,
        phase: TimerPhase,
        event: &TimerUpdateEvent,
        content: fn(u32, u32) -> NotificationContent,
    ) {
        let key = (phase, event.remaining_seconds);
        if self.shown == Some(key) {
            return;
        }
        self.shown = Some(key);

        let content = content(event.remaining_seconds, event.total_seconds);
        if let Err(e) = self.notifier.show(&content) {
            debug!("Failed to update rest indicator: {}", e);
        }
    }

    fn clear_indicator(&mut self) {
        if self.shown.take().is_none() {
            return;
        }
        if let Err(e) = self.notifier.cancel(PROGRESS_NOTIFICATION_ID) {
            debug!("Failed to cancel rest indicator: {}", e);
        }
    }

    fn on_complete(&mut self, settings: &Settings) {
        info!("Rest period complete");
        self.shown = Some((TimerPhase::Idle, 0));
        self.clear_indicator();

        if let Err(e) = self.notifier.show(&complete_content()) {
            warn!("Failed to send completion alert: {}", e);
        }

        if settings.sound_enabled {
            match &self.sound {
                Some(player) => {
                    let source = sound_for(settings.sound_file.as_deref());
                    if let Err(e) = player.play(&source) {
                        warn!("Failed to play completion sound: {}", e);
                    }
                }
                None => debug!("No audio device, completion sound skipped"),
            }
        }

        if settings.vibration_enabled && self.vibrator.is_available() {
            if let Err(e) = self.vibrator.vibrate(&VibrationPattern::rest_complete()) {
                warn!("Failed to vibrate: {}", e);
            }
        }
    }
}

/// Attaches `feedback` to `timer` and drives it on a new task.
pub fn spawn_feedback(timer: &RestTimer, feedback: TimerFeedback) -> JoinHandle<()> {
    let subscription = timer.subscribe(FEEDBACK_LISTENER);
    tokio::spawn(feedback.run(subscription))
}
