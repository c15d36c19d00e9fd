//! Rest timer subsystem.
//!
//! ```text
//!   RestTimer ──commands──▶ TimerService ──events──▶ Relay ──▶ Subscription(s)
//!   (any UI context)        (engine owner)                     ├─ UI views
//!                                                              └─ TimerFeedback
//! ```
//!
//! The countdown is computed from a fixed deadline, so dropped or late ticks
//! never make it drift. UI contexts may come and go; the service keeps
//! counting as long as one handle (or the daemon) is alive.

pub mod client;
pub mod engine;
pub mod feedback;
pub mod relay;
pub mod service;

pub use client::{resolve_rest_seconds, RestTimer, Subscription};
pub use engine::{CountdownEngine, TICK_INTERVAL};
pub use feedback::{spawn_feedback, TimerFeedback, FEEDBACK_LISTENER};
pub use relay::{ListenerId, Relay};
pub use service::TimerService;
