//! liftlog library
//!
//! Core functionality for planning and logging strength training:
//! - Rest timer engine, actor service and event relay
//! - Notification, sound and vibration feedback for the rest timer
//! - Workout data model and an in-process store with live queries
//! - Effective-set volume analysis per muscle
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod analysis;
pub mod cli;
pub mod daemon;
pub mod model;
pub mod notification;
pub mod settings;
pub mod sound;
pub mod store;
pub mod timer;
pub mod types;
pub mod vibration;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, ResponseData, TimerCommand, TimerPhase, TimerState, TimerUpdateEvent,
};

pub use timer::{
    resolve_rest_seconds, spawn_feedback, ListenerId, RestTimer, Subscription, TimerFeedback,
    TimerService,
};

pub use store::{Database, LiveQuery, StoreError};

pub use analysis::{
    analyze_sessions, analyze_templates, MuscleLookup, MuscleMap, VolumeOptions, VolumeReport,
};

pub use settings::{FileSettings, Settings, SettingsProvider, StaticSettings};

pub use notification::{MockNotifier, NotificationError, Notifier};

pub use sound::{MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer, SoundSource};

pub use vibration::{MockVibrator, NoopVibrator, VibrationError, Vibrator};
