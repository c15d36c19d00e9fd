//! Folders and custom exercises.

use crate::model::{CustomExercise, CustomExerciseId, Folder, FolderId, Muscle};

use super::{next_position, require_name, Database, Result, StoreError};

impl Database {
    pub fn create_folder(&self, name: &str) -> Result<Folder> {
        let name = require_name(name, "folder")?;
        self.write(|t| {
            let folder = Folder {
                id: FolderId::new(),
                name,
                position: next_position(t.folders.values().map(|f| f.position)),
            };
            t.folders.insert(folder.id, folder.clone());
            Ok(folder)
        })
    }

    pub fn rename_folder(&self, id: FolderId, name: &str) -> Result<Folder> {
        let name = require_name(name, "folder")?;
        self.write(|t| {
            let folder = t
                .folders
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("folder", id))?;
            folder.name = name;
            Ok(folder.clone())
        })
    }

    /// Deletes a folder. Its templates stay, unfiled.
    pub fn delete_folder(&self, id: FolderId) -> Result<()> {
        self.write(|t| {
            t.folders
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("folder", id))?;
            for template in t.templates.values_mut() {
                if template.folder_id == Some(id) {
                    template.folder_id = None;
                }
            }
            Ok(())
        })
    }

    /// Folders ordered by position.
    pub fn folders(&self) -> Vec<Folder> {
        let mut folders: Vec<_> = self.read(|t| t.folders.values().cloned().collect());
        folders.sort_by_key(|f| f.position);
        folders
    }

    /// Adds a user-defined exercise. Names are unique regardless of case.
    pub fn create_custom_exercise(
        &self,
        name: &str,
        primary_muscle: Muscle,
        auxiliary_muscles: Vec<Muscle>,
    ) -> Result<CustomExercise> {
        let exercise = CustomExercise {
            id: CustomExerciseId::new(),
            name: require_name(name, "exercise")?,
            primary_muscle,
            auxiliary_muscles: normalize_auxiliary(primary_muscle, auxiliary_muscles),
        };
        self.write(|t| {
            ensure_unique_exercise_name(t.custom_exercises.values(), &exercise)?;
            t.custom_exercises.insert(exercise.id, exercise.clone());
            Ok(exercise)
        })
    }

    pub fn update_custom_exercise(&self, exercise: CustomExercise) -> Result<CustomExercise> {
        let exercise = CustomExercise {
            name: require_name(&exercise.name, "exercise")?,
            auxiliary_muscles: normalize_auxiliary(
                exercise.primary_muscle,
                exercise.auxiliary_muscles,
            ),
            ..exercise
        };
        self.write(|t| {
            if !t.custom_exercises.contains_key(&exercise.id) {
                return Err(StoreError::not_found("custom exercise", exercise.id));
            }
            ensure_unique_exercise_name(t.custom_exercises.values(), &exercise)?;
            t.custom_exercises.insert(exercise.id, exercise.clone());
            Ok(exercise)
        })
    }

    pub fn delete_custom_exercise(&self, id: CustomExerciseId) -> Result<()> {
        self.write(|t| {
            t.custom_exercises
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found("custom exercise", id))
        })
    }

    /// Custom exercises ordered by name.
    pub fn custom_exercises(&self) -> Vec<CustomExercise> {
        let mut exercises: Vec<_> = self.read(|t| t.custom_exercises.values().cloned().collect());
        exercises.sort_by_key(|e| e.name.to_lowercase());
        exercises
    }

    pub fn find_custom_exercise(&self, name: &str) -> Option<CustomExercise> {
        let name = name.trim();
        self.read(|t| {
            t.custom_exercises
                .values()
                .find(|e| e.name.eq_ignore_ascii_case(name))
                .cloned()
        })
    }
}

fn ensure_unique_exercise_name<'a>(
    mut existing: impl Iterator<Item = &'a CustomExercise>,
    exercise: &CustomExercise,
) -> Result<()> {
    if existing.any(|e| e.id != exercise.id && e.name.eq_ignore_ascii_case(&exercise.name)) {
        return Err(StoreError::Duplicate {
            entity: "custom exercise",
            name: exercise.name.clone(),
        });
    }
    Ok(())
}

/// Drops duplicates and the primary muscle from the auxiliary list.
fn normalize_auxiliary(primary: Muscle, mut auxiliary: Vec<Muscle>) -> Vec<Muscle> {
    auxiliary.retain(|m| *m != primary);
    auxiliary.sort();
    auxiliary.dedup();
    auxiliary
}
