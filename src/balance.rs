use crate::model::EmployeeId;
use std::collections::BTreeMap;

/// Points cumulés par employé sur tout l'horizon planifié.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceTracker {
    points: BTreeMap<EmployeeId, f64>,
}

impl BalanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inscrit un employé à 0 point s'il est absent.
    pub fn register(&mut self, employee: &EmployeeId) {
        self.points.entry(employee.clone()).or_insert(0.0);
    }

    pub fn add(&mut self, employee: &EmployeeId, points: f64) {
        *self.points.entry(employee.clone()).or_insert(0.0) += points;
    }

    pub fn subtract(&mut self, employee: &EmployeeId, points: f64) {
        *self.points.entry(employee.clone()).or_insert(0.0) -= points;
    }

    pub fn get(&self, employee: &EmployeeId) -> f64 {
        self.points.get(employee).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> &BTreeMap<EmployeeId, f64> {
        &self.points
    }

    /// Écart entre le plus chargé et le moins chargé.
    pub fn spread(&self) -> f64 {
        let mut values = self.points.values().copied();
        let Some(first) = values.next() else {
            return 0.0;
        };
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        max - min
    }
}
