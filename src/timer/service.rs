//! Long-lived task that owns the countdown.
//!
//! The service is an actor: it is the only place the engine and the listener
//! registry are mutated. Callers talk to it through [`RestTimer`] handles;
//! it keeps running however many UI contexts come and go, and stops once
//! every handle is gone or [`RestTimer::shutdown`] is called.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::types::{TimerCommand, TimerState, TimerUpdateEvent};

use super::client::RestTimer;
use super::engine::{CountdownEngine, TICK_INTERVAL};
use super::relay::{ListenerId, Relay};

// ============================================================================
// Request
// ============================================================================

/// Messages accepted by the service task.
#[derive(Debug)]
pub(crate) enum Request {
    Command(TimerCommand),
    State(oneshot::Sender<TimerState>),
    Subscribe {
        id: ListenerId,
        token: u64,
        sender: mpsc::UnboundedSender<TimerUpdateEvent>,
    },
    Unsubscribe {
        id: ListenerId,
        token: u64,
    },
    Shutdown,
}

// ============================================================================
// TimerService
// ============================================================================

/// Actor hosting the countdown engine and the event relay.
pub struct TimerService {
    engine: CountdownEngine,
    relay: Relay,
    requests: mpsc::UnboundedReceiver<Request>,
    ticker: Option<Interval>,
}

impl TimerService {
    /// Creates a service and the handle used to drive it.
    ///
    /// The service does nothing until [`TimerService::run`] is awaited.
    pub fn new() -> (Self, RestTimer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            engine: CountdownEngine::new(),
            relay: Relay::new(),
            requests: rx,
            ticker: None,
        };
        (service, RestTimer::from_sender(tx))
    }

    /// Spawns the service on the current tokio runtime.
    pub fn spawn() -> (RestTimer, JoinHandle<()>) {
        let (service, timer) = Self::new();
        let handle = tokio::spawn(service.run());
        (timer, handle)
    }

    /// Runs the service loop until shutdown.
    pub async fn run(mut self) {
        info!("Rest timer service started");

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.handle(request),
                },
                _ = next_tick(&mut self.ticker) => self.on_tick(),
                _ = deadline(self.engine.deadline()) => self.on_tick(),
            }
        }

        self.ticker = None;
        info!("Rest timer service stopped");
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Command(command) => {
                debug!(?command, "Timer command received");
                if let Some(event) = self.engine.apply(command, Instant::now()) {
                    self.publish(event);
                }
                self.sync_ticker();
            }
            Request::State(reply) => {
                let _ = reply.send(self.engine.state(Instant::now()));
            }
            Request::Subscribe { id, token, sender } => {
                self.relay.subscribe(id, token, sender);
            }
            Request::Unsubscribe { id, token } => {
                self.relay.unsubscribe(id, token);
            }
            Request::Shutdown => {}
        }
    }

    fn on_tick(&mut self) {
        if let Some(event) = self.engine.tick(Instant::now()) {
            self.publish(event);
        }
        self.sync_ticker();
    }

    fn publish(&mut self, event: TimerUpdateEvent) {
        let delivered = self.relay.broadcast(&event);
        trace!(?event, delivered, "Timer update published");
    }

    /// Keeps a ticker only while the countdown is running.
    fn sync_ticker(&mut self) {
        match (self.engine.is_running(), self.ticker.is_some()) {
            (true, false) => {
                let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(ticker);
            }
            (false, true) => self.ticker = None,
            _ => {}
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
