use crate::model::{Employee, EmployeeId};
use chrono::{Datelike, NaiveDate, Weekday};

/// Du vendredi soir au samedi : à l'échelle du jour, vendredi et samedi.
pub(super) fn in_sabbath_window(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Fri | Weekday::Sat)
}

pub(super) fn find_employee<'a>(roster: &'a [Employee], id: &EmployeeId) -> Option<&'a Employee> {
    roster.iter().find(|e| &e.id == id)
}
