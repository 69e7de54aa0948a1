use super::{availability, types::RunReport, SchedError, Scheduler};
use crate::calendar::DateRange;
use crate::model::{Assignment, AssignmentKey, Employee, EmployeeId};
use crate::schedule::Schedule;
use std::cmp::Ordering;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Génération gloutonne, en un seul passage chronologique.
pub(super) fn generate(
    scheduler: &mut Scheduler,
    range: &DateRange,
) -> Result<RunReport, SchedError> {
    let days = range.days()?;

    let Scheduler {
        employees,
        classifier,
        weights,
        config,
        schedule,
        rejected,
    } = scheduler;

    schedule.begin(employees.iter().map(|e| &e.id))?;
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("generate", %run_id);
    let _enter = span.enter();
    info!(
        days = days.len(),
        employees = employees.len(),
        "starting generation"
    );

    let mut issues = std::mem::take(rejected);
    let mut required_slots = 0usize;
    let mut filled_slots = 0usize;

    for date in days {
        let day = classifier.classify(date);
        let mut taken_today: Vec<EmployeeId> = Vec::with_capacity(day.slots.len());

        for &duty in &day.slots {
            required_slots += 1;
            let key = AssignmentKey::new(date, duty);

            let mut pool = availability::eligible(employees, date, duty);
            if config.prefer_distinct_same_day && !taken_today.is_empty() {
                let fresh: Vec<&Employee> = pool
                    .iter()
                    .copied()
                    .filter(|e| !taken_today.contains(&e.id))
                    .collect();
                if !fresh.is_empty() {
                    pool = fresh;
                }
            }

            let Some(chosen) = pick(&pool, schedule, config.position_weighting) else {
                warn!(%date, %duty, "no eligible employee, slot left unfilled");
                schedule.record_unfilled(key);
                issues.push(SchedError::UnfillableSlot { date, duty });
                continue;
            };

            let weight = day.slot_weight(duty, weights);
            debug!(%date, %duty, employee = %chosen.id, weight, "assigned");
            taken_today.push(chosen.id.clone());
            schedule.record(Assignment {
                key,
                employee: chosen.id.clone(),
                weight,
                holiday: day.is_holiday(),
            });
            filled_slots += 1;
        }
    }

    schedule.finish();
    info!(
        required_slots,
        filled_slots,
        spread = schedule.balance().spread(),
        "generation finished"
    );

    Ok(RunReport {
        run_id,
        required_slots,
        filled_slots,
        issues,
    })
}

/// Moins de points d'abord ; puis moins d'affectations ; puis identifiant.
pub(super) fn pick<'a>(
    pool: &[&'a Employee],
    schedule: &Schedule,
    position_weighting: bool,
) -> Option<&'a Employee> {
    pool.iter()
        .copied()
        .min_by(|a, b| compare(a, b, schedule, position_weighting))
}

fn compare(a: &Employee, b: &Employee, schedule: &Schedule, position_weighting: bool) -> Ordering {
    let balance = schedule.balance();
    balance
        .get(&a.id)
        .total_cmp(&balance.get(&b.id))
        .then_with(|| {
            load(a, schedule, position_weighting).total_cmp(&load(b, schedule, position_weighting))
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Nombre d'affectations, ramené au temps plein si la pondération est active.
fn load(employee: &Employee, schedule: &Schedule, position_weighting: bool) -> f64 {
    let count = f64::from(schedule.assignment_count(&employee.id));
    if position_weighting {
        count * 100.0 / f64::from(employee.position_percentage)
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_prefers_lowest_points_then_count_then_id() {
        let roster = vec![
            Employee::new("Charlie", ""),
            Employee::new("Bob", ""),
            Employee::new("Alice", ""),
        ];
        let schedule = Schedule::new();
        let pool: Vec<&Employee> = roster.iter().collect();
        let chosen = pick(&pool, &schedule, false).unwrap();
        assert_eq!(chosen.name, "Alice");
        assert!(pick(&[], &schedule, false).is_none());
    }

    #[test]
    fn position_weighting_favours_full_time_on_count_ties() {
        let mut part_time = Employee::new("Alice", "");
        part_time.position_percentage = 50;
        let full_time = Employee::new("Bob", "");
        let roster = vec![part_time, full_time];

        let mut schedule = Schedule::new();
        schedule.begin(roster.iter().map(|e| &e.id)).unwrap();
        for (day, who) in [(1, "Alice"), (2, "Bob")] {
            let date = chrono::NaiveDate::from_ymd_opt(2025, 9, day).unwrap();
            schedule.record(Assignment {
                key: AssignmentKey::new(date, crate::model::DutyType::Weekday),
                employee: EmployeeId::new(who),
                weight: 1.0,
                holiday: false,
            });
        }

        let pool: Vec<&Employee> = roster.iter().collect();
        assert_eq!(pick(&pool, &schedule, false).unwrap().name, "Alice");
        assert_eq!(pick(&pool, &schedule, true).unwrap().name, "Bob");
    }
}
