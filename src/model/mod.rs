//! Workout entities.
//!
//! Plain data: the store enforces relationships, the analyzer folds over
//! them. Every table has its own UUID newtype so ids cannot be mixed up.

mod body;
mod muscle;
mod workout;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use body::{Phase, WeightEntry};
pub use muscle::{CustomExercise, Muscle, MuscleParseError};
pub use workout::{
    ExerciseLog, ExerciseLogView, Folder, Session, SessionView, SetLog, SetType, Template,
    TemplateExercise, TemplateExerciseView, TemplateSet, TemplateView,
};

macro_rules! id_type {
    ($($(#[$meta:meta])* $name:ident;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub fn nil() -> Self {
                Self(Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(Uuid::from_bytes(value.to_be_bytes()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    )+};
}

id_type! {
    FolderId;
    TemplateId;
    TemplateExerciseId;
    TemplateSetId;
    SessionId;
    ExerciseLogId;
    SetLogId;
    PhaseId;
    WeightEntryId;
    CustomExerciseId;
}
