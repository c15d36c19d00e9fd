use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CustomExerciseId;

/// Muscle groups tracked by the volume analyzer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Muscle {
    Neck,
    Chest,
    Traps,
    Lats,
    UpperBack,
    FrontDelts,
    SideDelts,
    RearDelts,
    Biceps,
    Triceps,
    Forearms,
    Abs,
    Obliques,
    LowerBack,
    Glutes,
    Abductors,
    Quads,
    Hamstrings,
    Adductors,
    Calves,
}

impl Muscle {
    pub const ALL: [Muscle; 20] = [
        Muscle::Neck,
        Muscle::Chest,
        Muscle::Traps,
        Muscle::Lats,
        Muscle::UpperBack,
        Muscle::FrontDelts,
        Muscle::SideDelts,
        Muscle::RearDelts,
        Muscle::Biceps,
        Muscle::Triceps,
        Muscle::Forearms,
        Muscle::Abs,
        Muscle::Obliques,
        Muscle::LowerBack,
        Muscle::Glutes,
        Muscle::Abductors,
        Muscle::Quads,
        Muscle::Hamstrings,
        Muscle::Adductors,
        Muscle::Calves,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Muscle::Neck => "Neck",
            Muscle::Chest => "Chest",
            Muscle::Traps => "Traps",
            Muscle::Lats => "Lats",
            Muscle::UpperBack => "Upper Back",
            Muscle::FrontDelts => "Front Delts",
            Muscle::SideDelts => "Side Delts",
            Muscle::RearDelts => "Rear Delts",
            Muscle::Biceps => "Biceps",
            Muscle::Triceps => "Triceps",
            Muscle::Forearms => "Forearms",
            Muscle::Abs => "Abs",
            Muscle::Obliques => "Obliques",
            Muscle::LowerBack => "Lower Back",
            Muscle::Glutes => "Glutes",
            Muscle::Abductors => "Abductors",
            Muscle::Quads => "Quads",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::Adductors => "Adductors",
            Muscle::Calves => "Calves",
        }
    }
}

impl fmt::Display for Muscle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown muscle: {0}")]
pub struct MuscleParseError(pub String);

impl FromStr for Muscle {
    type Err = MuscleParseError;

    /// Accepts display names and snake_case keys, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        Muscle::ALL
            .into_iter()
            .find(|m| m.name().to_ascii_lowercase().replace(' ', "_") == key)
            .ok_or_else(|| MuscleParseError(s.to_string()))
    }
}

/// User-defined exercise with its muscle mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomExercise {
    pub id: CustomExerciseId,
    /// Unique, compared case-insensitively
    pub name: String,
    pub primary_muscle: Muscle,
    pub auxiliary_muscles: Vec<Muscle>,
}
