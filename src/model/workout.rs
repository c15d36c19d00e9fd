use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ExerciseLogId, FolderId, SessionId, SetLogId, TemplateExerciseId, TemplateId, TemplateSetId,
};

/// Kind of a set, as far as volume counting is concerned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetType {
    #[default]
    Regular,
    Warmup,
    DropSet,
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub position: u32,
}

/// A reusable workout plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub notes: String,
    /// Rest after each set unless the exercise overrides it
    pub default_rest_seconds: Option<u32>,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub id: TemplateExerciseId,
    pub template_id: TemplateId,
    pub exercise_name: String,
    pub position: u32,
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSet {
    pub id: TemplateSetId,
    pub template_exercise_id: TemplateExerciseId,
    pub position: u32,
    pub set_type: SetType,
    pub target_reps: Option<u32>,
    pub target_weight: Option<f64>,
}

// ============================================================================
// Sessions
// ============================================================================

/// One performed workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Template the session was started from, cleared if it is deleted
    pub template_id: Option<TemplateId>,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl Session {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: ExerciseLogId,
    pub session_id: SessionId,
    pub exercise_name: String,
    pub position: u32,
    /// Copied from the template exercise when the session is started
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    pub id: SetLogId,
    pub exercise_log_id: ExerciseLogId,
    pub position: u32,
    pub set_type: SetType,
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub rest_seconds: Option<u32>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Views
// ============================================================================

/// A template with its exercises and sets, ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateView {
    pub template: Template,
    pub exercises: Vec<TemplateExerciseView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExerciseView {
    pub exercise: TemplateExercise,
    pub sets: Vec<TemplateSet>,
}

/// A session with its exercise logs and sets, ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session: Session,
    pub exercises: Vec<ExerciseLogView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLogView {
    pub exercise: ExerciseLog,
    pub sets: Vec<SetLog>,
}

impl SessionView {
    /// Number of completed sets across all exercises.
    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .count()
    }

    /// Sum of weight × reps over completed sets.
    #[must_use]
    pub fn volume_load(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .map(|s| s.weight.unwrap_or(0.0) * f64::from(s.reps.unwrap_or(0)))
            .sum()
    }
}
