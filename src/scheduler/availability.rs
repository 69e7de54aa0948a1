use super::{types::Unavailability, util};
use crate::model::{DutyType, Employee};
use chrono::NaiveDate;

/// Première règle qui exclut `employee` du créneau, dans l'ordre : blocage, puis shabbat.
/// Le taux d'occupation n'exclut jamais ; il ne sert qu'au départage.
pub fn unavailability(
    employee: &Employee,
    date: NaiveDate,
    duty: DutyType,
) -> Option<Unavailability> {
    if employee.is_blocked(date) {
        return Some(Unavailability::Blocked);
    }
    if employee.observes_sabbath && duty.is_weekend_slot() && util::in_sabbath_window(date) {
        return Some(Unavailability::Sabbath);
    }
    None
}

pub fn is_eligible(employee: &Employee, date: NaiveDate, duty: DutyType) -> bool {
    unavailability(employee, date, duty).is_none()
}

/// Employés éligibles, dans l'ordre du roster. Vide si personne ne convient.
pub fn eligible(roster: &[Employee], date: NaiveDate, duty: DutyType) -> Vec<&Employee> {
    roster
        .iter()
        .filter(|e| is_eligible(e, date, duty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockedRange;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
    }

    #[test]
    fn blocked_days_and_ranges_exclude() {
        let mut bob = Employee::new("Bob", "bob@example.com");
        bob.block_day(d(15));
        bob.add_blocked_range(BlockedRange::new(d(20), d(22)).unwrap())
            .unwrap();

        assert_eq!(
            unavailability(&bob, d(15), DutyType::Weekday),
            Some(Unavailability::Blocked)
        );
        assert!(!is_eligible(&bob, d(20), DutyType::Weekend));
        assert!(!is_eligible(&bob, d(22), DutyType::Weekday));
        assert!(is_eligible(&bob, d(23), DutyType::Weekday));
    }

    #[test]
    fn sabbath_only_excludes_weekend_slots_on_friday_and_saturday() {
        let carol = Employee::new("Carol", "carol@example.com").observing_sabbath();
        // 2025-09-05 vendredi, 2025-09-06 samedi, 2025-09-07 dimanche
        assert_eq!(
            unavailability(&carol, d(6), DutyType::Weekend),
            Some(Unavailability::Sabbath)
        );
        assert!(!is_eligible(&carol, d(5), DutyType::Backup));
        assert!(is_eligible(&carol, d(5), DutyType::Weekday));
        assert!(is_eligible(&carol, d(7), DutyType::Weekend));
    }

    #[test]
    fn eligible_keeps_roster_order() {
        let mut bob = Employee::new("Bob", "");
        bob.block_day(d(6));
        let roster = vec![
            Employee::new("Zoe", ""),
            bob,
            Employee::new("Alice", ""),
        ];
        let names: Vec<_> = eligible(&roster, d(6), DutyType::Weekend)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zoe", "Alice"]);
        assert!(eligible(&roster[1..2], d(6), DutyType::Weekend).is_empty());
    }
}
