use crate::model::{AssignmentKey, DutyType, EmployeeId};
use crate::schedule::ScheduleState;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Raison pour laquelle un employé ne peut pas tenir un créneau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailability {
    Blocked,
    Sabbath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// L'employé a bloqué cette date depuis la génération.
    Blocked,
    /// Créneau week-end/backup tenu par un employé qui respecte le shabbat.
    Sabbath,
    /// Deux créneaux le même jour pour le même employé.
    DoubleBooking,
    /// L'employé n'est plus dans le roster.
    UnknownEmployee,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub employee: EmployeeId,
    pub key: AssignmentKey,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("no eligible employee for {duty} on {date}")]
    UnfillableSlot { date: NaiveDate, duty: DutyType },
    #[error("invalid record {record}: {reason}")]
    Validation { record: String, reason: String },
    #[error("swap conflict: {0}")]
    SwapConflict(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot {action} a schedule in state {state}")]
    InvalidState {
        state: ScheduleState,
        action: &'static str,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchedError {
    /// Vrai pour les erreurs qui interrompent un run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SchedError::Configuration(_) | SchedError::InvalidState { .. } | SchedError::Other(_)
        )
    }
}

/// Bilan d'une génération : créneaux demandés, pourvus, et erreurs récupérables collectées.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub required_slots: usize,
    pub filled_slots: usize,
    pub issues: Vec<SchedError>,
}

impl RunReport {
    pub fn unfilled(&self) -> impl Iterator<Item = AssignmentKey> + '_ {
        self.issues.iter().filter_map(|e| match e {
            SchedError::UnfillableSlot { date, duty } => Some(AssignmentKey::new(*date, *duty)),
            _ => None,
        })
    }

    pub fn rejected_records(&self) -> impl Iterator<Item = &SchedError> {
        self.issues
            .iter()
            .filter(|e| matches!(e, SchedError::Validation { .. }))
    }

    pub fn is_complete(&self) -> bool {
        self.filled_slots == self.required_slots
    }
}
