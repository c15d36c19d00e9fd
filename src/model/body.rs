use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PhaseId, WeightEntryId};

/// A training block such as a cut or a bulk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub name: String,
    pub started_on: NaiveDate,
    pub ended_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Phase {
    /// Returns true if `date` falls inside the phase.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.started_on && self.ended_on.is_none_or(|end| date <= end)
    }
}

/// A body weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: WeightEntryId,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub phase_id: Option<PhaseId>,
}
