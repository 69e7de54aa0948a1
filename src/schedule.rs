use crate::balance::BalanceTracker;
use crate::model::{Assignment, AssignmentKey, DutyType, EmployeeId};
use crate::scheduler::SchedError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cycle de vie d'un planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleState {
    #[default]
    Empty,
    Generating,
    Generated,
    Swapped,
    Exported,
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleState::Empty => "empty",
            ScheduleState::Generating => "generating",
            ScheduleState::Generated => "generated",
            ScheduleState::Swapped => "swapped",
            ScheduleState::Exported => "exported",
        };
        f.write_str(s)
    }
}

/// Vue d'export `{date: {code: nom}}`.
pub type ScheduleExport = BTreeMap<NaiveDate, BTreeMap<DutyType, String>>;

/// Forme persistée d'un planning : identifiants d'employés, sans poids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default)]
    pub assignments: BTreeMap<NaiveDate, BTreeMap<DutyType, EmployeeId>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unfilled: Vec<AssignmentKey>,
    /// Planning déjà exporté : plus aucun échange possible après rechargement.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exported: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ScheduleDocument {
    pub fn len(&self) -> usize {
        self.assignments.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ensemble des affectations d'un run et soldes de points associés.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    state: ScheduleState,
    assignments: BTreeMap<AssignmentKey, Assignment>,
    balance: BalanceTracker,
    counts: BTreeMap<EmployeeId, u32>,
    unfilled: Vec<AssignmentKey>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, key: &AssignmentKey) -> Option<&Assignment> {
        self.assignments.get(key)
    }

    /// Affectations triées par (date, type).
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    pub fn assignments_of<'a>(
        &'a self,
        employee: &'a EmployeeId,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments.values().filter(move |a| &a.employee == employee)
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Assignment> {
        let lo = AssignmentKey::new(date, DutyType::ALL[0]);
        let hi = AssignmentKey::new(date, DutyType::ALL[DutyType::ALL.len() - 1]);
        self.assignments.range(lo..=hi).map(|(_, a)| a)
    }

    pub fn balance(&self) -> &BalanceTracker {
        &self.balance
    }

    pub fn assignment_count(&self, employee: &EmployeeId) -> u32 {
        self.counts.get(employee).copied().unwrap_or(0)
    }

    pub fn unfilled(&self) -> &[AssignmentKey] {
        &self.unfilled
    }

    pub fn document(&self) -> ScheduleDocument {
        let mut assignments: BTreeMap<NaiveDate, BTreeMap<DutyType, EmployeeId>> = BTreeMap::new();
        for a in self.assignments.values() {
            assignments
                .entry(a.key.date)
                .or_default()
                .insert(a.key.duty, a.employee.clone());
        }
        ScheduleDocument {
            assignments,
            unfilled: self.unfilled.clone(),
            exported: self.state == ScheduleState::Exported,
        }
    }

    fn ensure(&self, allowed: &[ScheduleState], action: &'static str) -> Result<(), SchedError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SchedError::InvalidState {
                state: self.state,
                action,
            })
        }
    }

    /// Empty → Generating ; chaque employé du roster démarre à 0 point.
    pub(crate) fn begin<'a>(
        &mut self,
        roster: impl IntoIterator<Item = &'a EmployeeId>,
    ) -> Result<(), SchedError> {
        self.ensure(&[ScheduleState::Empty], "generate")?;
        for id in roster {
            self.balance.register(id);
            self.counts.entry(id.clone()).or_insert(0);
        }
        self.state = ScheduleState::Generating;
        Ok(())
    }

    pub(crate) fn record(&mut self, assignment: Assignment) {
        debug_assert_eq!(self.state, ScheduleState::Generating);
        self.balance.add(&assignment.employee, assignment.weight);
        *self.counts.entry(assignment.employee.clone()).or_insert(0) += 1;
        self.assignments.insert(assignment.key, assignment);
    }

    pub(crate) fn record_unfilled(&mut self, key: AssignmentKey) {
        debug_assert_eq!(self.state, ScheduleState::Generating);
        self.unfilled.push(key);
    }

    /// Generating → Generated
    pub(crate) fn finish(&mut self) {
        self.state = ScheduleState::Generated;
    }

    pub(crate) fn ensure_swappable(&self) -> Result<(), SchedError> {
        self.ensure(&[ScheduleState::Generated, ScheduleState::Swapped], "swap")
    }

    /// Échange les employés de deux affectations et corrige les soldes.
    /// Les deux clés doivent exister ; la validation métier est faite en amont.
    pub(crate) fn exchange(
        &mut self,
        first: &AssignmentKey,
        second: &AssignmentKey,
    ) -> Result<(), SchedError> {
        self.ensure_swappable()?;
        let (a, b) = match (self.assignments.get(first), self.assignments.get(second)) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            (None, _) => return Err(unknown_key(first)),
            (_, None) => return Err(unknown_key(second)),
        };

        self.balance.subtract(&a.employee, a.weight);
        self.balance.add(&a.employee, b.weight);
        self.balance.subtract(&b.employee, b.weight);
        self.balance.add(&b.employee, a.weight);

        if let Some(slot) = self.assignments.get_mut(first) {
            slot.employee = b.employee;
        }
        if let Some(slot) = self.assignments.get_mut(second) {
            slot.employee = a.employee;
        }
        self.state = ScheduleState::Swapped;
        Ok(())
    }

    pub(crate) fn mark_swapped(&mut self) -> Result<(), SchedError> {
        self.ensure_swappable()?;
        self.state = ScheduleState::Swapped;
        Ok(())
    }

    /// → Exported (définitif pour ce planning).
    pub(crate) fn mark_exported(&mut self) -> Result<(), SchedError> {
        self.ensure(
            &[
                ScheduleState::Generated,
                ScheduleState::Swapped,
                ScheduleState::Exported,
            ],
            "export",
        )?;
        self.state = ScheduleState::Exported;
        Ok(())
    }
}

pub(crate) fn unknown_key(key: &AssignmentKey) -> SchedError {
    SchedError::Validation {
        record: key.to_string(),
        reason: "no such assignment".into(),
    }
}
