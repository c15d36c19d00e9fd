//! Per-muscle training volume.
//!
//! A pure fold over templates or logged sessions: every set adds to the
//! counters of the exercise's primary muscle and of each auxiliary muscle.
//! Effective sets weight primary work at 1.0 and auxiliary work at 0.5.

mod catalog;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::model::{CustomExercise, Muscle, SessionView, SetType, TemplateView};

/// Weight of a set for its exercise's primary muscle.
pub const PRIMARY_WEIGHT: f64 = 1.0;

/// Weight of a set for each auxiliary muscle.
pub const AUXILIARY_WEIGHT: f64 = 0.5;

// ============================================================================
// Muscle lookup
// ============================================================================

/// Muscles an exercise trains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuscleTargets {
    pub primary: Muscle,
    pub auxiliary: Vec<Muscle>,
}

/// Maps exercise names to the muscles they train.
pub trait MuscleLookup {
    fn targets(&self, exercise_name: &str) -> Option<MuscleTargets>;
}

/// Case-insensitive exercise name → targets table.
#[derive(Debug, Clone, Default)]
pub struct MuscleMap {
    entries: HashMap<String, MuscleTargets>,
}

impl MuscleMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of common barbell, dumbbell, machine and bodyweight exercises.
    #[must_use]
    pub fn builtin() -> Self {
        let mut map = Self::new();
        for (name, primary, auxiliary) in catalog::BUILTIN_EXERCISES {
            map.insert(name, *primary, auxiliary.to_vec());
        }
        map
    }

    /// Adds user-defined exercises, overriding entries with the same name.
    #[must_use]
    pub fn with_custom(mut self, exercises: &[CustomExercise]) -> Self {
        for exercise in exercises {
            self.insert(
                &exercise.name,
                exercise.primary_muscle,
                exercise.auxiliary_muscles.clone(),
            );
        }
        self
    }

    pub fn insert(&mut self, name: &str, primary: Muscle, auxiliary: Vec<Muscle>) {
        self.entries
            .insert(key(name), MuscleTargets { primary, auxiliary });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MuscleLookup for MuscleMap {
    fn targets(&self, exercise_name: &str) -> Option<MuscleTargets> {
        self.entries.get(&key(exercise_name)).cloned()
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// Counting
// ============================================================================

/// Which set types count toward effective sets. Regular sets always do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VolumeOptions {
    pub include_warmup: bool,
    pub include_drop: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SetCounts {
    pub warmup: u32,
    pub regular: u32,
    pub drop: u32,
}

impl SetCounts {
    pub fn add(&mut self, set_type: SetType) {
        match set_type {
            SetType::Regular => self.regular += 1,
            SetType::Warmup => self.warmup += 1,
            SetType::DropSet => self.drop += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.warmup + self.regular + self.drop
    }

    /// Sets that count under `options`.
    #[must_use]
    pub fn counted(&self, options: VolumeOptions) -> u32 {
        let mut n = self.regular;
        if options.include_warmup {
            n += self.warmup;
        }
        if options.include_drop {
            n += self.drop;
        }
        n
    }
}

/// Set counts of one muscle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MuscleVolume {
    pub primary: SetCounts,
    pub auxiliary: SetCounts,
}

impl MuscleVolume {
    #[must_use]
    pub fn effective_sets(&self, options: VolumeOptions) -> f64 {
        f64::from(self.primary.counted(options)) * PRIMARY_WEIGHT
            + f64::from(self.auxiliary.counted(options)) * AUXILIARY_WEIGHT
    }
}

/// Volume per muscle plus the exercises that could not be mapped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolumeReport {
    pub options: VolumeOptions,
    pub muscles: BTreeMap<Muscle, MuscleVolume>,
    pub unmapped: BTreeSet<String>,
}

impl VolumeReport {
    #[must_use]
    pub fn new(options: VolumeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(&self, muscle: Muscle) -> MuscleVolume {
        self.muscles.get(&muscle).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn effective_sets(&self, muscle: Muscle) -> f64 {
        self.get(muscle).effective_sets(self.options)
    }

    /// Muscles with any effective volume, highest first.
    #[must_use]
    pub fn ranked(&self) -> Vec<(Muscle, f64)> {
        let mut ranked: Vec<_> = self
            .muscles
            .iter()
            .map(|(muscle, volume)| (*muscle, volume.effective_sets(self.options)))
            .filter(|(_, sets)| *sets > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    fn record(&mut self, lookup: &dyn MuscleLookup, exercise_name: &str, set_type: SetType) {
        let Some(targets) = lookup.targets(exercise_name) else {
            self.unmapped.insert(exercise_name.trim().to_string());
            return;
        };
        self.muscles
            .entry(targets.primary)
            .or_default()
            .primary
            .add(set_type);
        for muscle in targets.auxiliary {
            self.muscles.entry(muscle).or_default().auxiliary.add(set_type);
        }
    }
}

/// Volume planned by `templates`.
#[must_use]
pub fn analyze_templates(
    templates: &[TemplateView],
    lookup: &dyn MuscleLookup,
    options: VolumeOptions,
) -> VolumeReport {
    let mut report = VolumeReport::new(options);
    for exercise in templates.iter().flat_map(|t| &t.exercises) {
        if exercise.sets.is_empty() {
            if lookup.targets(&exercise.exercise.exercise_name).is_none() {
                report
                    .unmapped
                    .insert(exercise.exercise.exercise_name.trim().to_string());
            }
            continue;
        }
        for set in &exercise.sets {
            report.record(lookup, &exercise.exercise.exercise_name, set.set_type);
        }
    }
    report
}

/// Volume actually performed in `sessions`. Only completed sets count.
#[must_use]
pub fn analyze_sessions(
    sessions: &[SessionView],
    lookup: &dyn MuscleLookup,
    options: VolumeOptions,
) -> VolumeReport {
    let mut report = VolumeReport::new(options);
    for exercise in sessions.iter().flat_map(|s| &s.exercises) {
        for set in exercise.sets.iter().filter(|s| s.completed) {
            report.record(lookup, &exercise.exercise.exercise_name, set.set_type);
        }
    }
    report
}
