//! Training phases and body weight.

use chrono::NaiveDate;

use crate::model::{Phase, PhaseId, WeightEntry, WeightEntryId};

use super::{require_name, Database, Result, StoreError};

impl Database {
    pub fn create_phase(
        &self,
        name: &str,
        started_on: NaiveDate,
        ended_on: Option<NaiveDate>,
    ) -> Result<Phase> {
        let name = require_name(name, "phase")?;
        check_range(started_on, ended_on)?;
        self.write(|t| {
            let phase = Phase {
                id: PhaseId::new(),
                name,
                started_on,
                ended_on,
                notes: String::new(),
            };
            t.phases.insert(phase.id, phase.clone());
            Ok(phase)
        })
    }

    pub fn end_phase(&self, id: PhaseId, ended_on: NaiveDate) -> Result<Phase> {
        self.write(|t| {
            let phase = t
                .phases
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("phase", id))?;
            check_range(phase.started_on, Some(ended_on))?;
            phase.ended_on = Some(ended_on);
            Ok(phase.clone())
        })
    }

    /// Deletes a phase. Weight entries stay, without a phase.
    pub fn delete_phase(&self, id: PhaseId) -> Result<()> {
        self.write(|t| {
            t.phases
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("phase", id))?;
            for entry in t.weight_entries.values_mut() {
                if entry.phase_id == Some(id) {
                    entry.phase_id = None;
                }
            }
            Ok(())
        })
    }

    /// Phases ordered by start date.
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases: Vec<_> = self.read(|t| t.phases.values().cloned().collect());
        phases.sort_by_key(|p| p.started_on);
        phases
    }

    /// The latest-starting phase that contains `date`.
    pub fn phase_on(&self, date: NaiveDate) -> Option<Phase> {
        self.phases().into_iter().rev().find(|p| p.contains(date))
    }

    /// Records a body weight.
    ///
    /// Without an explicit phase the entry joins the phase running on `date`.
    pub fn log_weight(
        &self,
        date: NaiveDate,
        weight_kg: f64,
        phase_id: Option<PhaseId>,
    ) -> Result<WeightEntry> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(StoreError::InvalidInput(
                "body weight must be positive".to_string(),
            ));
        }
        let inferred = match phase_id {
            Some(_) => None,
            None => self.phase_on(date).map(|p| p.id),
        };
        self.write(|t| {
            if let Some(id) = phase_id {
                if !t.phases.contains_key(&id) {
                    return Err(StoreError::missing_parent("phase", id));
                }
            }
            let entry = WeightEntry {
                id: WeightEntryId::new(),
                date,
                weight_kg,
                phase_id: phase_id.or(inferred.filter(|id| t.phases.contains_key(id))),
            };
            t.weight_entries.insert(entry.id, entry.clone());
            Ok(entry)
        })
    }

    pub fn delete_weight(&self, id: WeightEntryId) -> Result<()> {
        self.write(|t| {
            t.weight_entries
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found("weight entry", id))
        })
    }

    /// Weight entries ordered by date.
    pub fn weight_entries(&self) -> Vec<WeightEntry> {
        let mut entries: Vec<_> = self.read(|t| t.weight_entries.values().cloned().collect());
        entries.sort_by_key(|e| e.date);
        entries
    }

    pub fn weight_entries_in_phase(&self, phase_id: PhaseId) -> Vec<WeightEntry> {
        self.weight_entries()
            .into_iter()
            .filter(|e| e.phase_id == Some(phase_id))
            .collect()
    }
}

fn check_range(started_on: NaiveDate, ended_on: Option<NaiveDate>) -> Result<()> {
    if ended_on.is_some_and(|end| end < started_on) {
        return Err(StoreError::InvalidInput(
            "phase cannot end before it starts".to_string(),
        ));
    }
    Ok(())
}
