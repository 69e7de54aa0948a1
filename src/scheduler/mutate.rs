use super::{availability, types::Unavailability, util, SchedError, Scheduler};
use crate::model::{AssignmentKey, EmployeeId};
use crate::schedule::unknown_key;
use tracing::info;

/// Échange atomique de deux affectations : tout est validé avant la moindre mutation.
pub(super) fn swap(
    scheduler: &mut Scheduler,
    first: AssignmentKey,
    second: AssignmentKey,
) -> Result<(), SchedError> {
    scheduler.schedule.ensure_swappable()?;

    let a = scheduler
        .schedule
        .get(&first)
        .ok_or_else(|| unknown_key(&first))?
        .employee
        .clone();
    let b = scheduler
        .schedule
        .get(&second)
        .ok_or_else(|| unknown_key(&second))?
        .employee
        .clone();

    if first == second || a == b {
        return scheduler.schedule.mark_swapped();
    }

    check_destination(scheduler, &a, second)?;
    check_destination(scheduler, &b, first)?;
    if scheduler.config.prefer_distinct_same_day {
        check_same_day(scheduler, &a, first, second)?;
        check_same_day(scheduler, &b, first, second)?;
    }

    scheduler.schedule.exchange(&first, &second)?;
    info!(%first, %second, from = %a, to = %b, "swap applied");
    Ok(())
}

fn check_destination(
    scheduler: &Scheduler,
    employee: &EmployeeId,
    target: AssignmentKey,
) -> Result<(), SchedError> {
    let Some(person) = util::find_employee(&scheduler.employees, employee) else {
        return Err(SchedError::SwapConflict(format!(
            "{employee} is not in the roster"
        )));
    };
    match availability::unavailability(person, target.date, target.duty) {
        None => Ok(()),
        Some(Unavailability::Blocked) => Err(SchedError::SwapConflict(format!(
            "{employee} is blocked on {}",
            target.date
        ))),
        Some(Unavailability::Sabbath) => Err(SchedError::SwapConflict(format!(
            "{employee} observes sabbath and cannot take {target}"
        ))),
    }
}

/// Refuse un échange qui donnerait deux créneaux le même jour à `employee`.
fn check_same_day(
    scheduler: &Scheduler,
    employee: &EmployeeId,
    first: AssignmentKey,
    second: AssignmentKey,
) -> Result<(), SchedError> {
    let holds_first = scheduler.schedule.get(&first).map(|a| &a.employee) == Some(employee);
    let destination = if holds_first { second } else { first };
    let clash = scheduler
        .schedule
        .on_date(destination.date)
        .find(|a| &a.employee == employee && a.key != first && a.key != second);
    match clash {
        Some(other) => Err(SchedError::SwapConflict(format!(
            "{employee} already holds {} on {}",
            other.key.duty, destination.date
        ))),
        None => Ok(()),
    }
}
