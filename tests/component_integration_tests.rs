//! Component integration tests for the rest timer.
//!
//! These tests drive the timer service through its public handle on tokio's
//! paused clock:
//! - pause/resume keeps the remaining time
//! - subtracting past zero completes immediately
//! - late listeners get no backfill
//! - listeners see identical sequences
//! - set completion in the store starts the right rest period
//! - feedback reaches the notifier, sound and vibration backends

use std::sync::Arc;

use tokio::time::{sleep, Duration};

use liftlog::model::SetType;
use liftlog::notification::{MockNotifier, NotifierCall, COMPLETE_NOTIFICATION_ID};
use liftlog::settings::{FileSettings, Settings, SettingsProvider, StaticSettings};
use liftlog::sound::{MockSoundPlayer, SoundPlayer};
use liftlog::store::Database;
use liftlog::timer::{spawn_feedback, ListenerId, Subscription, TimerFeedback, TimerService};
use liftlog::types::{TimerPhase, TimerUpdateEvent};
use liftlog::vibration::MockVibrator;

// ============================================================================
// Test Helpers
// ============================================================================

/// Collects every event already queued for `sub`.
fn drain(sub: &mut Subscription) -> Vec<TimerUpdateEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv() {
        events.push(event);
    }
    events
}

fn completions(events: &[TimerUpdateEvent]) -> usize {
    events.iter().filter(|e| e.is_complete).count()
}

/// Lets the service process everything due at the current instant.
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

/// Yields until `done` holds, giving blocking-pool work real time to finish.
///
/// The test task stays ready throughout, so the paused clock does not move.
async fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !done() {
        assert!(std::time::Instant::now() < deadline, "condition not reached");
        std::thread::sleep(std::time::Duration::from_millis(1));
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Countdown Scenarios
// ============================================================================

mod countdown_scenarios {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume_keeps_remaining_time() {
        let (timer, _service) = TimerService::spawn();
        let mut sub = timer.subscribe(ListenerId::new(1));

        timer.start(90);
        sleep(Duration::from_secs(30)).await;
        timer.pause();

        let paused = timer.current_state().await;
        assert!(!paused.is_running);
        assert!((59..=60).contains(&paused.remaining_seconds));

        // Time spent paused does not count.
        sleep(Duration::from_secs(120)).await;
        assert_eq!(timer.current_state().await, paused);

        timer.resume();
        sleep(Duration::from_secs(60)).await;
        settle().await;

        let events = drain(&mut sub);
        assert_eq!(completions(&events), 1);
        assert!(events.last().unwrap().is_complete);
        assert!(timer.current_state().await.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subtract_past_zero_completes_immediately() {
        let (timer, _service) = TimerService::spawn();
        let mut sub = timer.subscribe(ListenerId::new(1));

        timer.start(30);
        timer.subtract_time(45);

        let state = timer.current_state().await;
        assert!(state.is_idle());
        assert_eq!(state.remaining_seconds, 0);

        let events = drain(&mut sub);
        assert_eq!(events.len(), 2);
        let done = events[1];
        assert!(done.is_complete);
        assert_eq!(done.remaining_seconds, 0);
        assert!(done.total_seconds >= 1);

        // Nothing else fires later.
        sleep(Duration::from_secs(60)).await;
        assert!(drain(&mut sub).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_undrained_listener_still_sees_completion() {
        let (timer, _service) = TimerService::spawn();
        let mut sub = timer.subscribe(ListenerId::new(1));

        // Nobody reads the queue for the whole rest period and beyond.
        timer.start(60);
        sleep(Duration::from_secs(61)).await;
        settle().await;

        let events = drain(&mut sub);
        assert!(events.len() > 60);
        assert_eq!(completions(&events), 1);
        let last = events.last().unwrap();
        assert!(last.is_complete);
        assert_eq!(last.remaining_seconds, 0);
        for pair in events.windows(2) {
            assert!(pair[0].remaining_seconds >= pair[1].remaining_seconds);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_listener_gets_no_backfill() {
        let (timer, _service) = TimerService::spawn();

        timer.start(60);
        sleep(Duration::from_secs(10)).await;

        let mut sub = timer.subscribe(ListenerId::new(7));
        let state = timer.current_state().await;
        assert!(state.is_running);
        assert_eq!(state.remaining_seconds, 50);

        for event in drain(&mut sub) {
            assert!(event.remaining_seconds <= 50);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_listeners_see_identical_sequences() {
        let (timer, _service) = TimerService::spawn();
        let mut first = timer.subscribe(ListenerId::new(1));
        let mut second = timer.subscribe(ListenerId::new(2));

        timer.start(5);
        sleep(Duration::from_secs(2)).await;
        timer.pause();
        timer.add_time(3);
        timer.resume();
        sleep(Duration::from_secs(7)).await;
        settle().await;

        let a = drain(&mut first);
        let b = drain(&mut second);
        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert_eq!(completions(&a), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_twice_is_same_as_once() {
        let (timer, _service) = TimerService::spawn();
        let mut sub = timer.subscribe(ListenerId::new(1));

        timer.start(30);
        sleep(Duration::from_millis(4_200)).await;
        drain(&mut sub);

        timer.pause();
        let once = timer.current_state().await;
        timer.pause();
        let twice = timer.current_state().await;
        sleep(Duration::from_secs(5)).await;

        assert_eq!(once, twice);
        assert_eq!(twice, timer.current_state().await);
        let paused = drain(&mut sub)
            .into_iter()
            .filter(|e| e.phase() == TimerPhase::Paused)
            .count();
        assert_eq!(paused, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_then_subtract_restores_remaining() {
        let (timer, _service) = TimerService::spawn();

        timer.start(60);
        sleep(Duration::from_secs(10)).await;

        let before = timer.current_state().await;
        timer.add_time(30);
        timer.subtract_time(30);
        let after = timer.current_state().await;

        assert_eq!(before.remaining_seconds, after.remaining_seconds);
        assert_eq!(before.total_seconds, after.total_seconds);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_never_exceeds_total() {
        let (timer, _service) = TimerService::spawn();
        let mut sub = timer.subscribe(ListenerId::new(1));

        timer.start(20);
        sleep(Duration::from_secs(3)).await;
        timer.add_time(10);
        sleep(Duration::from_secs(2)).await;
        timer.subtract_time(25);
        sleep(Duration::from_secs(2)).await;
        timer.pause();
        timer.resume();
        sleep(Duration::from_secs(30)).await;

        let events = drain(&mut sub);
        assert!(!events.is_empty());
        for event in &events {
            assert!(event.remaining_seconds <= event.total_seconds, "{:?}", event);
        }
        assert_eq!(completions(&events), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_running_countdown() {
        let (timer, _service) = TimerService::spawn();
        let mut sub = timer.subscribe(ListenerId::new(1));

        timer.start(30);
        sleep(Duration::from_secs(5)).await;
        timer.start(90);

        let state = timer.current_state().await;
        assert_eq!(state.total_seconds, 90);
        assert_eq!(state.remaining_seconds, 90);

        sleep(Duration::from_secs(90)).await;
        settle().await;
        assert_eq!(completions(&drain(&mut sub)), 1);
    }
}

// ============================================================================
// Store and Timer
// ============================================================================

mod set_completion {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_completed_set_starts_template_rest() {
        let db = Database::new();
        let template = db.create_template("Push", None, Some(120)).unwrap();
        let bench = db
            .add_template_exercise(template.id, "Bench Press", None)
            .unwrap();
        db.add_template_set(bench.id, SetType::Regular, Some(5), Some(100.0))
            .unwrap();
        let session = db.start_session_from_template(template.id).unwrap();
        let set_id = session.exercises[0].sets[0].id;

        let (timer, _service) = TimerService::spawn();
        let settings = Settings::default();
        let rest = db.complete_set(set_id, settings.default_rest()).unwrap();

        assert_eq!(rest, Some(120));
        assert!(timer.on_set_completed(rest));
        let state = timer.current_state().await;
        assert!(state.is_running);
        assert_eq!(state.total_seconds, 120);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exercise_rest_overrides_template() {
        let db = Database::new();
        let template = db.create_template("Legs", None, Some(120)).unwrap();
        let squat = db
            .add_template_exercise(template.id, "Squat", Some(180))
            .unwrap();
        db.add_template_set(squat.id, SetType::Regular, Some(5), Some(140.0))
            .unwrap();
        let session = db.start_session_from_template(template.id).unwrap();

        let rest = db
            .complete_set(session.exercises[0].sets[0].id, Some(90))
            .unwrap();
        assert_eq!(rest, Some(180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_zero_rest_starts_no_timer() {
        let db = Database::new();
        let template = db.create_template("Circuit", None, Some(60)).unwrap();
        let burpee = db
            .add_template_exercise(template.id, "Burpee", Some(0))
            .unwrap();
        db.add_template_set(burpee.id, SetType::Regular, Some(10), None)
            .unwrap();
        let session = db.start_session_from_template(template.id).unwrap();

        let (timer, _service) = TimerService::spawn();
        let rest = db
            .complete_set(session.exercises[0].sets[0].id, Some(90))
            .unwrap();

        assert_eq!(rest, None);
        assert!(!timer.on_set_completed(rest));
        assert!(timer.current_state().await.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_default_applies_without_template() {
        let db = Database::new();
        let session = db.start_empty_session("Quick").unwrap();
        let curl = db.add_exercise_log(session.id, "Barbell Curl").unwrap();
        let set = db
            .log_set(curl.id, SetType::Regular, Some(30.0), Some(12), None)
            .unwrap();

        let settings = Settings::default().with_default_rest_seconds(75);
        let rest = db.complete_set(set.id, settings.default_rest()).unwrap();
        assert_eq!(rest, Some(75));
    }
}

// ============================================================================
// Feedback
// ============================================================================

mod feedback {
    use super::*;

    struct Backends {
        notifier: Arc<MockNotifier>,
        sound: Arc<MockSoundPlayer>,
        vibrator: Arc<MockVibrator>,
    }

    fn attach(timer: &liftlog::timer::RestTimer, settings: Settings) -> Backends {
        attach_with(timer, Arc::new(StaticSettings(settings)))
    }

    fn attach_with(
        timer: &liftlog::timer::RestTimer,
        settings: Arc<dyn SettingsProvider>,
    ) -> Backends {
        let backends = Backends {
            notifier: Arc::new(MockNotifier::new()),
            sound: Arc::new(MockSoundPlayer::new()),
            vibrator: Arc::new(MockVibrator::new()),
        };
        let feedback = TimerFeedback::new(
            backends.notifier.clone(),
            Some(backends.sound.clone() as Arc<dyn SoundPlayer>),
            backends.vibrator.clone(),
            settings,
        );
        spawn_feedback(timer, feedback);
        backends
    }

    impl Backends {
        fn alert_shown(&self) -> bool {
            self.notifier
                .shown()
                .iter()
                .any(|content| content.id == COMPLETE_NOTIFICATION_ID)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_alert_sound_and_vibration() {
        let (timer, _service) = TimerService::spawn();
        let backends = attach(&timer, Settings::default());

        timer.start(3);
        sleep(Duration::from_secs(3)).await;
        settle().await;
        wait_until(|| backends.alert_shown()).await;

        let alerts: Vec<_> = backends
            .notifier
            .calls()
            .into_iter()
            .filter(|call| {
                matches!(call, NotifierCall::Show(content) if content.id == COMPLETE_NOTIFICATION_ID)
            })
            .collect();
        assert_eq!(alerts.len(), 1);
        assert_eq!(backends.sound.play_count(), 1);
        assert_eq!(backends.vibrator.vibrate_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_silence_completion() {
        let (timer, _service) = TimerService::spawn();
        let settings = Settings::default()
            .with_sound(false)
            .with_vibration(false);
        let backends = attach(&timer, settings);

        timer.start(2);
        sleep(Duration::from_secs(2)).await;
        settle().await;
        wait_until(|| backends.alert_shown()).await;

        assert_eq!(backends.sound.play_count(), 0);
        assert_eq!(backends.vibrator.vibrate_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_file_is_read_at_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let (timer, _service) = TimerService::spawn();
        let backends = attach_with(&timer, Arc::new(FileSettings::new(&path)));

        // Edited after the daemon started, before the rest ends.
        timer.start(2);
        settle().await;
        std::fs::write(&path, r#"{"soundEnabled":false,"vibrationEnabled":true}"#).unwrap();

        sleep(Duration::from_secs(2)).await;
        settle().await;
        wait_until(|| backends.alert_shown()).await;

        assert_eq!(backends.sound.play_count(), 0);
        assert_eq!(backends.vibrator.vibrate_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_updates_are_throttled() {
        let (timer, _service) = TimerService::spawn();
        let backends = attach(&timer, Settings::default());

        timer.start(10);
        sleep(Duration::from_secs(4)).await;
        settle().await;

        // One indicator per displayed second: 10, 9, 8, 7, 6.
        let shows = backends.notifier.show_count();
        assert!((4..=6).contains(&shows), "{} indicator updates", shows);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_clears_indicator_without_alert() {
        let (timer, _service) = TimerService::spawn();
        let backends = attach(&timer, Settings::default());

        timer.start(30);
        settle().await;
        timer.skip();
        settle().await;

        assert!(matches!(
            backends.notifier.calls().last(),
            Some(NotifierCall::Cancel(_))
        ));
        assert!(backends
            .notifier
            .shown()
            .iter()
            .all(|content| content.id != COMPLETE_NOTIFICATION_ID));
        assert_eq!(backends.sound.play_count(), 0);
    }
}
