use super::{availability, types::Unavailability, util, Conflict, ConflictKind, Scheduler};
use crate::model::Assignment;

/// Revalide un planning contre le roster courant (blocages ajoutés après coup, etc.).
pub(super) fn detect_conflicts(scheduler: &Scheduler) -> Vec<Conflict> {
    let mut out = Vec::new();
    let mut previous: Option<&Assignment> = None;

    for a in scheduler.schedule.assignments() {
        if let Some(prev) = previous {
            if prev.key.date == a.key.date && prev.employee == a.employee {
                out.push(conflict(a, ConflictKind::DoubleBooking));
            }
        }
        previous = Some(a);

        let Some(person) = util::find_employee(&scheduler.employees, &a.employee) else {
            out.push(conflict(a, ConflictKind::UnknownEmployee));
            continue;
        };
        match availability::unavailability(person, a.key.date, a.key.duty) {
            Some(Unavailability::Blocked) => out.push(conflict(a, ConflictKind::Blocked)),
            Some(Unavailability::Sabbath) => out.push(conflict(a, ConflictKind::Sabbath)),
            None => {}
        }
    }

    out
}

fn conflict(a: &Assignment, kind: ConflictKind) -> Conflict {
    Conflict {
        employee: a.employee.clone(),
        key: a.key,
        kind,
    }
}
