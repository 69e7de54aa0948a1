use crate::model::{DutyType, Employee, EmployeeId};
use crate::schedule::Schedule;
use serde::Serialize;

/// Ligne de synthèse par employé : compteurs par type et points cumulés.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub name: String,
    pub weekday: u32,
    pub thursday: u32,
    pub weekend: u32,
    pub backup: u32,
    /// Créneaux tenus un jour férié (déjà comptés dans les colonnes ci-dessus).
    pub holiday: u32,
    pub total: u32,
    pub points: f64,
}

pub fn summarize(employees: &[Employee], schedule: &Schedule) -> Vec<EmployeeSummary> {
    let mut rows: Vec<EmployeeSummary> = employees
        .iter()
        .map(|e| {
            let mut row = EmployeeSummary {
                id: e.id.clone(),
                name: e.name.clone(),
                weekday: 0,
                thursday: 0,
                weekend: 0,
                backup: 0,
                holiday: 0,
                total: 0,
                points: schedule.balance().get(&e.id),
            };
            for a in schedule.assignments_of(&e.id) {
                match a.key.duty {
                    DutyType::Weekday => row.weekday += 1,
                    DutyType::Thursday => row.thursday += 1,
                    DutyType::Weekend => row.weekend += 1,
                    DutyType::Backup => row.backup += 1,
                    DutyType::Holiday => {}
                }
                if a.holiday || a.key.duty == DutyType::Holiday {
                    row.holiday += 1;
                }
                row.total += 1;
            }
            row
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    rows
}
