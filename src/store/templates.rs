//! Templates, their exercises and planned sets.

use crate::model::{
    FolderId, SetType, Template, TemplateExercise, TemplateExerciseId, TemplateExerciseView,
    TemplateId, TemplateSet, TemplateSetId, TemplateView,
};

use super::{next_position, require_name, Database, Result, StoreError, Tables};

impl Database {
    pub fn create_template(
        &self,
        name: &str,
        folder_id: Option<FolderId>,
        default_rest_seconds: Option<u32>,
    ) -> Result<Template> {
        let name = require_name(name, "template")?;
        self.write(|t| {
            check_folder(t, folder_id)?;
            let template = Template {
                id: TemplateId::new(),
                name,
                folder_id,
                notes: String::new(),
                default_rest_seconds,
                position: next_position(t.templates.values().map(|t| t.position)),
            };
            t.templates.insert(template.id, template.clone());
            Ok(template)
        })
    }

    pub fn update_template(&self, template: Template) -> Result<Template> {
        let template = Template {
            name: require_name(&template.name, "template")?,
            ..template
        };
        self.write(|t| {
            if !t.templates.contains_key(&template.id) {
                return Err(StoreError::not_found("template", template.id));
            }
            check_folder(t, template.folder_id)?;
            t.templates.insert(template.id, template.clone());
            Ok(template)
        })
    }

    /// Files a template into `folder_id`, or unfiles it with `None`.
    pub fn move_template(&self, id: TemplateId, folder_id: Option<FolderId>) -> Result<Template> {
        self.write(|t| {
            check_folder(t, folder_id)?;
            let template = t
                .templates
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("template", id))?;
            template.folder_id = folder_id;
            Ok(template.clone())
        })
    }

    /// Deletes a template with its exercises and sets.
    ///
    /// Sessions started from it are kept and lose the link.
    pub fn delete_template(&self, id: TemplateId) -> Result<()> {
        self.write(|t| {
            t.templates
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("template", id))?;

            let exercises: Vec<_> = t
                .template_exercises
                .values()
                .filter(|e| e.template_id == id)
                .map(|e| e.id)
                .collect();
            for exercise in exercises {
                remove_template_exercise(t, exercise);
            }

            for session in t.sessions.values_mut() {
                if session.template_id == Some(id) {
                    session.template_id = None;
                }
            }
            Ok(())
        })
    }

    /// Templates ordered by position.
    pub fn templates(&self) -> Vec<Template> {
        let mut templates: Vec<_> = self.read(|t| t.templates.values().cloned().collect());
        templates.sort_by_key(|t| t.position);
        templates
    }

    /// Templates filed in `folder_id`; `None` lists unfiled templates.
    pub fn templates_in_folder(&self, folder_id: Option<FolderId>) -> Vec<Template> {
        self.templates()
            .into_iter()
            .filter(|t| t.folder_id == folder_id)
            .collect()
    }

    /// A template with its exercises and sets.
    pub fn template(&self, id: TemplateId) -> Option<TemplateView> {
        self.read(|t| template_view(t, id))
    }

    /// Every template with its exercises and sets, ordered by position.
    pub fn template_views(&self) -> Vec<TemplateView> {
        let ids: Vec<_> = self.templates().into_iter().map(|t| t.id).collect();
        self.read(|t| ids.into_iter().filter_map(|id| template_view(t, id)).collect())
    }

    pub fn add_template_exercise(
        &self,
        template_id: TemplateId,
        exercise_name: &str,
        rest_seconds: Option<u32>,
    ) -> Result<TemplateExercise> {
        let exercise_name = require_name(exercise_name, "exercise")?;
        self.write(|t| {
            if !t.templates.contains_key(&template_id) {
                return Err(StoreError::missing_parent("template", template_id));
            }
            let exercise = TemplateExercise {
                id: TemplateExerciseId::new(),
                template_id,
                exercise_name,
                position: next_position(
                    t.template_exercises
                        .values()
                        .filter(|e| e.template_id == template_id)
                        .map(|e| e.position),
                ),
                rest_seconds,
                notes: String::new(),
            };
            t.template_exercises.insert(exercise.id, exercise.clone());
            Ok(exercise)
        })
    }

    pub fn update_template_exercise(&self, exercise: TemplateExercise) -> Result<TemplateExercise> {
        self.write(|t| {
            let current = t
                .template_exercises
                .get_mut(&exercise.id)
                .ok_or_else(|| StoreError::not_found("template exercise", exercise.id))?;
            if current.template_id != exercise.template_id {
                return Err(StoreError::InvalidInput(
                    "template exercises cannot be moved between templates".to_string(),
                ));
            }
            *current = exercise.clone();
            Ok(exercise)
        })
    }

    /// Removes an exercise and its sets from a template.
    pub fn remove_template_exercise(&self, id: TemplateExerciseId) -> Result<()> {
        self.write(|t| {
            if !remove_template_exercise(t, id) {
                return Err(StoreError::not_found("template exercise", id));
            }
            Ok(())
        })
    }

    pub fn add_template_set(
        &self,
        template_exercise_id: TemplateExerciseId,
        set_type: SetType,
        target_reps: Option<u32>,
        target_weight: Option<f64>,
    ) -> Result<TemplateSet> {
        self.write(|t| {
            if !t.template_exercises.contains_key(&template_exercise_id) {
                return Err(StoreError::missing_parent(
                    "template exercise",
                    template_exercise_id,
                ));
            }
            let set = TemplateSet {
                id: TemplateSetId::new(),
                template_exercise_id,
                position: next_position(
                    t.template_sets
                        .values()
                        .filter(|s| s.template_exercise_id == template_exercise_id)
                        .map(|s| s.position),
                ),
                set_type,
                target_reps,
                target_weight,
            };
            t.template_sets.insert(set.id, set.clone());
            Ok(set)
        })
    }

    pub fn remove_template_set(&self, id: TemplateSetId) -> Result<()> {
        self.write(|t| {
            t.template_sets
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found("template set", id))
        })
    }

    /// Copies a template with all exercises and sets under a new name.
    pub fn duplicate_template(&self, id: TemplateId) -> Result<TemplateView> {
        self.write(|t| {
            let source = template_view(t, id).ok_or_else(|| StoreError::not_found("template", id))?;

            let template = Template {
                id: TemplateId::new(),
                name: format!("{} (copy)", source.template.name),
                position: next_position(t.templates.values().map(|t| t.position)),
                ..source.template
            };
            t.templates.insert(template.id, template.clone());

            for view in source.exercises {
                let exercise = TemplateExercise {
                    id: TemplateExerciseId::new(),
                    template_id: template.id,
                    ..view.exercise
                };
                t.template_exercises.insert(exercise.id, exercise.clone());

                for set in view.sets {
                    let set = TemplateSet {
                        id: TemplateSetId::new(),
                        template_exercise_id: exercise.id,
                        ..set
                    };
                    t.template_sets.insert(set.id, set);
                }
            }

            template_view(t, template.id).ok_or_else(|| StoreError::not_found("template", template.id))
        })
    }
}

fn check_folder(t: &Tables, folder_id: Option<FolderId>) -> Result<()> {
    match folder_id {
        Some(id) if !t.folders.contains_key(&id) => Err(StoreError::missing_parent("folder", id)),
        _ => Ok(()),
    }
}

fn remove_template_exercise(t: &mut Tables, id: TemplateExerciseId) -> bool {
    if t.template_exercises.remove(&id).is_none() {
        return false;
    }
    t.template_sets.retain(|_, s| s.template_exercise_id != id);
    true
}

pub(super) fn template_view(t: &Tables, id: TemplateId) -> Option<TemplateView> {
    let template = t.templates.get(&id)?.clone();

    let mut exercises: Vec<_> = t
        .template_exercises
        .values()
        .filter(|e| e.template_id == id)
        .map(|exercise| {
            let mut sets: Vec<_> = t
                .template_sets
                .values()
                .filter(|s| s.template_exercise_id == exercise.id)
                .cloned()
                .collect();
            sets.sort_by_key(|s| s.position);
            TemplateExerciseView {
                exercise: exercise.clone(),
                sets,
            }
        })
        .collect();
    exercises.sort_by_key(|e| e.exercise.position);

    Some(TemplateView {
        template,
        exercises,
    })
}
