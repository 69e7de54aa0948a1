mod assignment;
pub mod availability;
mod conflicts;
mod mutate;
mod types;
mod util;

pub use types::{Conflict, ConflictKind, RunReport, SchedError, Unavailability};

use crate::calendar::{CalendarDay, Classifier, DateRange};
use crate::config::{DutyWeights, EngineConfig};
use crate::model::{Assignment, AssignmentKey, DutyType, Employee, EmployeeId, EmployeeRecord, Holiday};
use crate::report::{self, EmployeeSummary};
use crate::schedule::{Schedule, ScheduleDocument, ScheduleExport, ScheduleState};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::warn;

/// Scheduler : roster, calendrier et planning d'un run.
#[derive(Debug)]
pub struct Scheduler {
    employees: Vec<Employee>,
    classifier: Classifier,
    weights: DutyWeights,
    config: EngineConfig,
    schedule: Schedule,
    rejected: Vec<SchedError>,
}

impl Scheduler {
    /// Valide la configuration (erreur fatale) puis le roster ; les employés
    /// invalides et les doublons d'identifiant sont écartés et signalés dans le
    /// rapport du run.
    pub fn new(
        employees: Vec<Employee>,
        holidays: &[Holiday],
        config: EngineConfig,
    ) -> Result<Self, SchedError> {
        let weights = config.validate()?;
        let mut rejected = Vec::new();
        let mut seen = BTreeSet::new();
        let mut roster = Vec::with_capacity(employees.len());
        for e in employees {
            if let Err(err) = e.validate() {
                warn!(%err, "employee skipped");
                rejected.push(err);
                continue;
            }
            if !seen.insert(e.id.clone()) {
                warn!(employee = %e.id, "duplicate employee id skipped");
                rejected.push(SchedError::Validation {
                    record: e.id.to_string(),
                    reason: "duplicate employee id".into(),
                });
                continue;
            }
            roster.push(e);
        }

        let mut valid_holidays = Vec::with_capacity(holidays.len());
        for h in holidays {
            match h.validate() {
                Ok(()) => valid_holidays.push(h.clone()),
                Err(err) => {
                    warn!(%err, "holiday skipped");
                    rejected.push(err);
                }
            }
        }

        Ok(Self {
            employees: roster,
            classifier: Classifier::new(config.locale.clone(), &valid_holidays),
            weights,
            config,
            schedule: Schedule::new(),
            rejected,
        })
    }

    /// Comme [`Scheduler::new`], à partir d'enregistrements bruts : chaque
    /// enregistrement invalide est ignoré et rapporté, le run continue.
    pub fn from_records(
        records: Vec<EmployeeRecord>,
        holidays: &[Holiday],
        config: EngineConfig,
    ) -> Result<Self, SchedError> {
        let mut invalid = Vec::new();
        let mut employees = Vec::with_capacity(records.len());
        for record in &records {
            match record.validate() {
                Ok(e) => employees.push(e),
                Err(err) => {
                    warn!(%err, "employee record skipped");
                    invalid.push(err);
                }
            }
        }
        let mut scheduler = Self::new(employees, holidays, config)?;
        invalid.append(&mut scheduler.rejected);
        scheduler.rejected = invalid;
        Ok(scheduler)
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn find_employee(&self, id: &EmployeeId) -> Option<&Employee> {
        util::find_employee(&self.employees, id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn weights(&self) -> &DutyWeights {
        &self.weights
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Enregistrements écartés au chargement, pas encore rapportés par un run.
    pub fn rejected(&self) -> &[SchedError] {
        &self.rejected
    }

    pub fn classify(&self, date: NaiveDate) -> CalendarDay {
        self.classifier.classify(date)
    }

    /// Génère le planning de la période. Un `Scheduler` ne génère qu'une fois.
    pub fn generate(&mut self, range: &DateRange) -> Result<RunReport, SchedError> {
        assignment::generate(self, range)
    }

    pub fn swap(
        &mut self,
        date1: NaiveDate,
        duty1: DutyType,
        date2: NaiveDate,
        duty2: DutyType,
    ) -> Result<(), SchedError> {
        mutate::swap(
            self,
            AssignmentKey::new(date1, duty1),
            AssignmentKey::new(date2, duty2),
        )
    }

    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect_conflicts(self)
    }

    pub fn summary(&self) -> Vec<EmployeeSummary> {
        report::summarize(&self.employees, &self.schedule)
    }

    /// Vue `{date: {code: nom}}` ; fait passer le planning à l'état `Exported`.
    pub fn export(&mut self) -> Result<ScheduleExport, SchedError> {
        self.schedule.mark_exported()?;
        let mut out = ScheduleExport::new();
        for a in self.schedule.assignments() {
            let name = self
                .find_employee(&a.employee)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| a.employee.to_string());
            out.entry(a.key.date).or_default().insert(a.key.duty, name);
        }
        Ok(out)
    }

    pub fn document(&self) -> ScheduleDocument {
        self.schedule.document()
    }

    /// Recharge un planning persisté : les poids sont recalculés par le calendrier
    /// courant et les soldes reconstruits. Le planning repasse à l'état `Generated`,
    /// ou `Exported` s'il avait été exporté.
    pub fn restore(&mut self, doc: &ScheduleDocument) -> Result<(), SchedError> {
        if self.schedule.state() != ScheduleState::Empty {
            return Err(SchedError::InvalidState {
                state: self.schedule.state(),
                action: "restore",
            });
        }

        let mut assignments = Vec::with_capacity(doc.len());
        for (date, duties) in &doc.assignments {
            let day = self.classifier.classify(*date);
            for (duty, employee) in duties {
                let key = AssignmentKey::new(*date, *duty);
                if !day.slots.contains(duty) {
                    return Err(SchedError::Validation {
                        record: key.to_string(),
                        reason: "duty not required on that date".into(),
                    });
                }
                if self.find_employee(employee).is_none() {
                    warn!(%key, %employee, "assignment held by an employee missing from the roster");
                }
                assignments.push(Assignment {
                    key,
                    employee: employee.clone(),
                    weight: day.slot_weight(*duty, &self.weights),
                    holiday: day.is_holiday(),
                });
            }
        }

        let mut schedule = Schedule::new();
        schedule.begin(self.employees.iter().map(|e| &e.id))?;
        for a in assignments {
            schedule.record(a);
        }
        for key in &doc.unfilled {
            schedule.record_unfilled(*key);
        }
        schedule.finish();
        if doc.exported {
            schedule.mark_exported()?;
        }
        self.schedule = schedule;
        Ok(())
    }
}
