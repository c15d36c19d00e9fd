//! Handle used by UI contexts to drive the rest timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::types::{TimerCommand, TimerState, TimerUpdateEvent};

use super::relay::ListenerId;
use super::service::Request;

// ============================================================================
// RestTimer
// ============================================================================

/// Cloneable command/event surface of a running [`TimerService`].
///
/// Commands are fire-and-forget: the caller learns the outcome from the next
/// update event, not from a reply. Once the service has stopped, commands are
/// ignored and [`RestTimer::current_state`] reports the idle state.
///
/// [`TimerService`]: super::TimerService
#[derive(Debug, Clone)]
pub struct RestTimer {
    requests: mpsc::UnboundedSender<Request>,
    tokens: Arc<AtomicU64>,
}

impl RestTimer {
    pub(crate) fn from_sender(requests: mpsc::UnboundedSender<Request>) -> Self {
        Self {
            requests,
            tokens: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Starts a rest period of `seconds`. Zero is ignored.
    pub fn start(&self, seconds: u32) {
        if seconds == 0 {
            return;
        }
        self.send(TimerCommand::start_now(seconds));
    }

    /// Pauses the running countdown.
    pub fn pause(&self) {
        self.send(TimerCommand::Pause);
    }

    /// Resumes a paused countdown.
    pub fn resume(&self) {
        self.send(TimerCommand::Resume);
    }

    /// Cancels the countdown without the completion alert.
    pub fn skip(&self) {
        self.send(TimerCommand::Skip);
    }

    /// Adds `seconds` to the countdown.
    pub fn add_time(&self, seconds: u32) {
        self.send(TimerCommand::AddTime(seconds));
    }

    /// Removes `seconds` from the countdown.
    pub fn subtract_time(&self, seconds: u32) {
        self.send(TimerCommand::SubtractTime(seconds));
    }

    /// Sends a raw command.
    pub fn send(&self, command: TimerCommand) {
        if self.requests.send(Request::Command(command)).is_err() {
            debug!(?command, "Timer service gone, command dropped");
        }
    }

    /// Starts a rest period after a set was marked complete.
    ///
    /// `rest_seconds` is the already-resolved rest for the set; `None` or zero
    /// means no timer. Returns true if a countdown was requested.
    pub fn on_set_completed(&self, rest_seconds: Option<u32>) -> bool {
        match rest_seconds {
            Some(seconds) if seconds > 0 => {
                self.start(seconds);
                true
            }
            _ => false,
        }
    }

    /// Queries the state as of now.
    pub async fn current_state(&self) -> TimerState {
        let (tx, rx) = oneshot::channel();
        if self.requests.send(Request::State(tx)).is_err() {
            return TimerState::idle();
        }
        rx.await.unwrap_or_default()
    }

    /// Attaches `id` to the update stream.
    ///
    /// Only events produced after the subscription is processed are
    /// delivered. Subscribing an id again supersedes the earlier
    /// subscription, whose stream then ends.
    pub fn subscribe(&self, id: ListenerId) -> Subscription {
        let (sender, events) = mpsc::unbounded_channel();
        let token = self.tokens.fetch_add(1, Ordering::Relaxed);
        if self
            .requests
            .send(Request::Subscribe { id, token, sender })
            .is_err()
        {
            debug!(%id, "Timer service gone, subscription inert");
        }
        Subscription {
            id,
            token,
            events,
            requests: self.requests.downgrade(),
        }
    }

    /// Asks the service to stop.
    pub fn shutdown(&self) {
        let _ = self.requests.send(Request::Shutdown);
    }

    /// Returns true while the service is accepting requests.
    pub fn is_alive(&self) -> bool {
        !self.requests.is_closed()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Stream of update events for one listener.
///
/// Holds only a weak reference to the service; dropping it detaches the
/// listener.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    token: u64,
    events: mpsc::UnboundedReceiver<TimerUpdateEvent>,
    requests: mpsc::WeakUnboundedSender<Request>,
}

impl Subscription {
    /// The listener this subscription belongs to.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Waits for the next event. `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<TimerUpdateEvent> {
        self.events.recv().await
    }

    /// Returns a queued event without waiting.
    pub fn try_recv(&mut self) -> Option<TimerUpdateEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(requests) = self.requests.upgrade() {
            let _ = requests.send(Request::Unsubscribe {
                id: self.id,
                token: self.token,
            });
        }
    }
}

// ============================================================================
// Rest resolution
// ============================================================================

/// Picks the rest period for a completed set.
///
/// Candidates are ordered from most to least specific (set, exercise,
/// template, settings default). The first present value wins; a present zero
/// means "no rest" and stops the fallback.
pub fn resolve_rest_seconds(candidates: &[Option<u32>]) -> Option<u32> {
    candidates
        .iter()
        .find_map(|candidate| *candidate)
        .filter(|seconds| *seconds > 0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    use crate::timer::TimerService;
    use crate::types::TimerPhase;

    mod rest_resolution_tests {
        use super::*;

        #[test]
        fn test_most_specific_wins() {
            assert_eq!(resolve_rest_seconds(&[Some(60), Some(90), Some(120)]), Some(60));
            assert_eq!(resolve_rest_seconds(&[None, Some(90), Some(120)]), Some(90));
            assert_eq!(resolve_rest_seconds(&[None, None, Some(120)]), Some(120));
        }

        #[test]
        fn test_explicit_zero_disables_rest() {
            assert_eq!(resolve_rest_seconds(&[Some(0), Some(90)]), None);
        }

        #[test]
        fn test_nothing_configured() {
            assert_eq!(resolve_rest_seconds(&[None, None]), None);
            assert_eq!(resolve_rest_seconds(&[]), None);
        }
    }

    mod handle_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_on_set_completed_starts_timer() {
            let (timer, _handle) = TimerService::spawn();

            assert!(timer.on_set_completed(Some(75)));
            let state = timer.current_state().await;

            assert_eq!(state.phase(), TimerPhase::Running);
            assert_eq!(state.total_seconds, 75);
        }

        #[tokio::test(start_paused = true)]
        async fn test_on_set_completed_without_rest() {
            let (timer, _handle) = TimerService::spawn();

            assert!(!timer.on_set_completed(None));
            assert!(!timer.on_set_completed(Some(0)));
            assert!(timer.current_state().await.is_idle());
        }

        #[tokio::test(start_paused = true)]
        async fn test_commands_after_service_gone_are_ignored() {
            let (timer, handle) = TimerService::spawn();
            timer.shutdown();
            handle.await.unwrap();

            timer.start(30);
            timer.pause();
            assert_eq!(timer.current_state().await, TimerState::idle());
        }

        #[tokio::test(start_paused = true)]
        async fn test_dropping_subscription_detaches_listener() {
            let (timer, _handle) = TimerService::spawn();
            let keep = timer.subscribe(ListenerId::new(1));
            let gone = timer.subscribe(ListenerId::new(2));
            drop(gone);

            timer.start(5);
            sleep(Duration::from_millis(10)).await;

            drop(keep);
            timer.skip();
            // Service stays healthy with no listeners attached.
            assert!(timer.current_state().await.is_idle());
        }

        #[tokio::test(start_paused = true)]
        async fn test_resubscribe_same_id_ends_old_stream() {
            let (timer, _handle) = TimerService::spawn();
            let mut first = timer.subscribe(ListenerId::new(9));
            let mut second = timer.subscribe(ListenerId::new(9));

            timer.start(20);

            assert!(first.recv().await.is_none());
            let event = second.recv().await.unwrap();
            assert_eq!(event.remaining_seconds, 20);
            assert!(second.try_recv().is_none());
        }
    }
}
