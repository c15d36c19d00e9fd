//! Workout sessions and logged sets.

use chrono::Utc;

use crate::model::{
    ExerciseLog, ExerciseLogId, ExerciseLogView, Session, SessionId, SessionView, SetLog, SetLogId,
    SetType, TemplateId,
};
use crate::timer::resolve_rest_seconds;

use super::templates::template_view;
use super::{next_position, require_name, Database, Result, StoreError, Tables};

impl Database {
    pub fn start_empty_session(&self, name: &str) -> Result<Session> {
        let name = require_name(name, "session")?;
        self.write(|t| {
            let session = Session {
                id: SessionId::new(),
                template_id: None,
                name,
                started_at: Utc::now(),
                finished_at: None,
                notes: String::new(),
            };
            t.sessions.insert(session.id, session.clone());
            Ok(session)
        })
    }

    /// Starts a session pre-filled with the template's exercises and sets.
    ///
    /// Planned reps and weights become the logged values; nothing is marked
    /// complete yet.
    pub fn start_session_from_template(&self, template_id: TemplateId) -> Result<SessionView> {
        self.write(|t| {
            let template = template_view(t, template_id)
                .ok_or_else(|| StoreError::missing_parent("template", template_id))?;

            let session = Session {
                id: SessionId::new(),
                template_id: Some(template_id),
                name: template.template.name.clone(),
                started_at: Utc::now(),
                finished_at: None,
                notes: String::new(),
            };
            t.sessions.insert(session.id, session.clone());

            for planned in template.exercises {
                let log = ExerciseLog {
                    id: ExerciseLogId::new(),
                    session_id: session.id,
                    exercise_name: planned.exercise.exercise_name,
                    position: planned.exercise.position,
                    rest_seconds: planned.exercise.rest_seconds,
                    notes: planned.exercise.notes,
                };
                for set in planned.sets {
                    let set = SetLog {
                        id: SetLogId::new(),
                        exercise_log_id: log.id,
                        position: set.position,
                        set_type: set.set_type,
                        weight: set.target_weight,
                        reps: set.target_reps,
                        rest_seconds: None,
                        completed: false,
                        completed_at: None,
                    };
                    t.set_logs.insert(set.id, set);
                }
                t.exercise_logs.insert(log.id, log);
            }

            session_view(t, session.id).ok_or_else(|| StoreError::not_found("session", session.id))
        })
    }

    pub fn add_exercise_log(&self, session_id: SessionId, exercise_name: &str) -> Result<ExerciseLog> {
        let exercise_name = require_name(exercise_name, "exercise")?;
        self.write(|t| {
            if !t.sessions.contains_key(&session_id) {
                return Err(StoreError::missing_parent("session", session_id));
            }
            let log = ExerciseLog {
                id: ExerciseLogId::new(),
                session_id,
                exercise_name,
                position: next_position(
                    t.exercise_logs
                        .values()
                        .filter(|e| e.session_id == session_id)
                        .map(|e| e.position),
                ),
                rest_seconds: None,
                notes: String::new(),
            };
            t.exercise_logs.insert(log.id, log.clone());
            Ok(log)
        })
    }

    /// Appends a set to an exercise log.
    pub fn log_set(
        &self,
        exercise_log_id: ExerciseLogId,
        set_type: SetType,
        weight: Option<f64>,
        reps: Option<u32>,
        rest_seconds: Option<u32>,
    ) -> Result<SetLog> {
        if weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
            return Err(StoreError::InvalidInput(
                "weight must be a non-negative number".to_string(),
            ));
        }
        self.write(|t| {
            if !t.exercise_logs.contains_key(&exercise_log_id) {
                return Err(StoreError::missing_parent("exercise log", exercise_log_id));
            }
            let set = SetLog {
                id: SetLogId::new(),
                exercise_log_id,
                position: next_position(
                    t.set_logs
                        .values()
                        .filter(|s| s.exercise_log_id == exercise_log_id)
                        .map(|s| s.position),
                ),
                set_type,
                weight,
                reps,
                rest_seconds,
                completed: false,
                completed_at: None,
            };
            t.set_logs.insert(set.id, set.clone());
            Ok(set)
        })
    }

    pub fn update_set(&self, set: SetLog) -> Result<SetLog> {
        self.write(|t| {
            let current = t
                .set_logs
                .get_mut(&set.id)
                .ok_or_else(|| StoreError::not_found("set", set.id))?;
            if current.exercise_log_id != set.exercise_log_id {
                return Err(StoreError::InvalidInput(
                    "sets cannot be moved between exercises".to_string(),
                ));
            }
            *current = set.clone();
            Ok(set)
        })
    }

    /// Marks a set as done and returns the rest period to start, if any.
    ///
    /// The rest comes from the set, then its exercise, then the session's
    /// template, then `default_rest_seconds` (normally the settings value).
    pub fn complete_set(&self, id: SetLogId, default_rest_seconds: Option<u32>) -> Result<Option<u32>> {
        self.write(|t| {
            let set = t
                .set_logs
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("set", id))?;
            set.completed = true;
            set.completed_at = Some(Utc::now());
            let set = set.clone();

            let exercise = t.exercise_logs.get(&set.exercise_log_id);
            let template_rest = exercise
                .and_then(|e| t.sessions.get(&e.session_id))
                .and_then(|s| s.template_id)
                .and_then(|id| t.templates.get(&id))
                .and_then(|template| template.default_rest_seconds);

            Ok(resolve_rest_seconds(&[
                set.rest_seconds,
                exercise.and_then(|e| e.rest_seconds),
                template_rest,
                default_rest_seconds,
            ]))
        })
    }

    pub fn uncomplete_set(&self, id: SetLogId) -> Result<SetLog> {
        self.write(|t| {
            let set = t
                .set_logs
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("set", id))?;
            set.completed = false;
            set.completed_at = None;
            Ok(set.clone())
        })
    }

    pub fn delete_set(&self, id: SetLogId) -> Result<()> {
        self.write(|t| {
            t.set_logs
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found("set", id))
        })
    }

    /// Deletes an exercise log and its sets.
    pub fn delete_exercise_log(&self, id: ExerciseLogId) -> Result<()> {
        self.write(|t| {
            if !remove_exercise_log(t, id) {
                return Err(StoreError::not_found("exercise log", id));
            }
            Ok(())
        })
    }

    /// Stamps the finish time. Finishing twice keeps the first time.
    pub fn finish_session(&self, id: SessionId) -> Result<Session> {
        self.write(|t| {
            let session = t
                .sessions
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("session", id))?;
            session.finished_at.get_or_insert_with(Utc::now);
            Ok(session.clone())
        })
    }

    /// Deletes a session with all its exercise logs and sets.
    pub fn delete_session(&self, id: SessionId) -> Result<()> {
        self.write(|t| {
            t.sessions
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("session", id))?;
            let logs: Vec<_> = t
                .exercise_logs
                .values()
                .filter(|e| e.session_id == id)
                .map(|e| e.id)
                .collect();
            for log in logs {
                remove_exercise_log(t, log);
            }
            Ok(())
        })
    }

    pub fn session(&self, id: SessionId) -> Option<SessionView> {
        self.read(|t| session_view(t, id))
    }

    /// Sessions, most recent first.
    pub fn sessions_history(&self) -> Vec<Session> {
        let mut sessions: Vec<_> = self.read(|t| t.sessions.values().cloned().collect());
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions
    }

    /// Every session with its logs, most recent first.
    pub fn session_views(&self) -> Vec<SessionView> {
        let ids: Vec<_> = self.sessions_history().into_iter().map(|s| s.id).collect();
        self.read(|t| ids.into_iter().filter_map(|id| session_view(t, id)).collect())
    }

    /// The most recently started session that is not finished.
    pub fn active_session(&self) -> Option<Session> {
        self.sessions_history()
            .into_iter()
            .find(|s| !s.is_finished())
    }
}

fn remove_exercise_log(t: &mut Tables, id: ExerciseLogId) -> bool {
    if t.exercise_logs.remove(&id).is_none() {
        return false;
    }
    t.set_logs.retain(|_, s| s.exercise_log_id != id);
    true
}

fn session_view(t: &Tables, id: SessionId) -> Option<SessionView> {
    let session = t.sessions.get(&id)?.clone();

    let mut exercises: Vec<_> = t
        .exercise_logs
        .values()
        .filter(|e| e.session_id == id)
        .map(|exercise| {
            let mut sets: Vec<_> = t
                .set_logs
                .values()
                .filter(|s| s.exercise_log_id == exercise.id)
                .cloned()
                .collect();
            sets.sort_by_key(|s| s.position);
            ExerciseLogView {
                exercise: exercise.clone(),
                sets,
            }
        })
        .collect();
    exercises.sort_by_key(|e| e.exercise.position);

    Some(SessionView { session, exercises })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_with_rest(db: &Database, template_rest: Option<u32>, exercise_rest: Option<u32>) -> TemplateId {
        let template = db.create_template("Legs", None, template_rest).unwrap();
        let squat = db
            .add_template_exercise(template.id, "Squat", exercise_rest)
            .unwrap();
        db.add_template_set(squat.id, SetType::Warmup, Some(8), Some(60.0))
            .unwrap();
        db.add_template_set(squat.id, SetType::Regular, Some(5), Some(140.0))
            .unwrap();
        template.id
    }

    #[test]
    fn test_start_from_template_copies_plan() {
        let db = Database::new();
        let template_id = template_with_rest(&db, None, Some(150));

        let view = db.start_session_from_template(template_id).unwrap();

        assert_eq!(view.session.name, "Legs");
        assert_eq!(view.session.template_id, Some(template_id));
        let squat = &view.exercises[0];
        assert_eq!(squat.exercise.rest_seconds, Some(150));
        assert_eq!(squat.sets.len(), 2);
        assert_eq!(squat.sets[1].weight, Some(140.0));
        assert_eq!(squat.sets[1].reps, Some(5));
        assert!(squat.sets.iter().all(|s| !s.completed));
    }

    #[test]
    fn test_start_from_missing_template() {
        let db = Database::new();
        assert!(matches!(
            db.start_session_from_template(TemplateId::new()),
            Err(StoreError::MissingParent { .. })
        ));
        assert!(db.sessions_history().is_empty());
    }

    #[test]
    fn test_complete_set_resolves_rest() {
        let db = Database::new();
        let template_id = template_with_rest(&db, Some(120), Some(150));
        let view = db.start_session_from_template(template_id).unwrap();
        let sets = &view.exercises[0].sets;

        // Exercise rest beats template and settings.
        assert_eq!(db.complete_set(sets[0].id, Some(90)).unwrap(), Some(150));

        // Set rest beats everything.
        let mut set = sets[1].clone();
        set.rest_seconds = Some(45);
        db.update_set(set).unwrap();
        assert_eq!(db.complete_set(sets[1].id, Some(90)).unwrap(), Some(45));

        let view = db.session(view.session.id).unwrap();
        assert_eq!(view.completed_sets(), 2);
        assert!(view.exercises[0].sets[0].completed_at.is_some());
    }

    #[test]
    fn test_complete_set_falls_back_to_template_then_settings() {
        let db = Database::new();
        let template_id = template_with_rest(&db, Some(120), None);
        let view = db.start_session_from_template(template_id).unwrap();
        let set_id = view.exercises[0].sets[0].id;
        assert_eq!(db.complete_set(set_id, Some(90)).unwrap(), Some(120));

        let session = db.start_empty_session("Quick").unwrap();
        let log = db.add_exercise_log(session.id, "Curl").unwrap();
        let set = db.log_set(log.id, SetType::Regular, Some(20.0), Some(12), None).unwrap();
        assert_eq!(db.complete_set(set.id, Some(90)).unwrap(), Some(90));
        assert_eq!(db.complete_set(set.id, None).unwrap(), None);
    }

    #[test]
    fn test_complete_set_with_zero_rest_starts_no_timer() {
        let db = Database::new();
        let session = db.start_empty_session("Quick").unwrap();
        let log = db.add_exercise_log(session.id, "Plank").unwrap();
        let set = db.log_set(log.id, SetType::Regular, None, None, Some(0)).unwrap();

        assert_eq!(db.complete_set(set.id, Some(90)).unwrap(), None);
    }

    #[test]
    fn test_log_set_checks_parent_and_weight() {
        let db = Database::new();
        assert!(matches!(
            db.log_set(ExerciseLogId::new(), SetType::Regular, None, Some(5), None),
            Err(StoreError::MissingParent { .. })
        ));

        let session = db.start_empty_session("Quick").unwrap();
        let log = db.add_exercise_log(session.id, "Row").unwrap();
        assert!(matches!(
            db.log_set(log.id, SetType::Regular, Some(-5.0), Some(5), None),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_delete_session_cascades() {
        let db = Database::new();
        let template_id = template_with_rest(&db, None, None);
        let view = db.start_session_from_template(template_id).unwrap();

        db.delete_session(view.session.id).unwrap();

        db.read(|t| {
            assert!(t.exercise_logs.is_empty());
            assert!(t.set_logs.is_empty());
        });
        assert!(db.template(template_id).is_some());
    }

    #[test]
    fn test_finish_session_and_history_order() {
        let db = Database::new();
        let first = db.start_empty_session("Morning").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = db.start_empty_session("Evening").unwrap();

        let finished = db.finish_session(first.id).unwrap();
        let again = db.finish_session(first.id).unwrap();
        assert_eq!(finished.finished_at, again.finished_at);

        let history = db.sessions_history();
        assert_eq!(history[0].id, second.id);
        assert_eq!(db.active_session().map(|s| s.id), Some(second.id));
    }

    #[test]
    fn test_uncomplete_and_delete_set() {
        let db = Database::new();
        let session = db.start_empty_session("Quick").unwrap();
        let log = db.add_exercise_log(session.id, "Press").unwrap();
        let set = db.log_set(log.id, SetType::DropSet, Some(30.0), Some(10), None).unwrap();

        db.complete_set(set.id, None).unwrap();
        let set = db.uncomplete_set(set.id).unwrap();
        assert!(!set.completed);
        assert!(set.completed_at.is_none());

        db.delete_set(set.id).unwrap();
        assert!(db.session(session.id).unwrap().exercises[0].sets.is_empty());

        db.delete_exercise_log(log.id).unwrap();
        assert!(db.session(session.id).unwrap().exercises.is_empty());
    }
}
