#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate};
use permanence::{
    AssignmentKey, ConflictKind, DateRange, Employee, EngineConfig, Scheduler, SchedError,
};
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
}

/// (jours bloqués en offset depuis le 1er, observe le shabbat)
fn arb_roster() -> impl Strategy<Value = Vec<(Vec<u8>, bool)>> {
    prop::collection::vec(
        (prop::collection::vec(0u8..21, 0..8), any::<bool>()),
        1..5,
    )
}

fn build(roster: &[(Vec<u8>, bool)]) -> Scheduler {
    build_with(roster, EngineConfig::default())
}

fn build_with(roster: &[(Vec<u8>, bool)], config: EngineConfig) -> Scheduler {
    let employees = roster
        .iter()
        .enumerate()
        .map(|(i, (blocked, sabbath))| {
            let mut e = Employee::new(format!("E{i}"), "");
            if *sabbath {
                e = e.observing_sabbath();
            }
            for off in blocked {
                e.block_day(start() + Duration::days(i64::from(*off)));
            }
            e
        })
        .collect();
    Scheduler::new(employees, &[], config).unwrap()
}

fn range() -> DateRange {
    DateRange::span(start(), start() + Duration::days(20))
}

proptest! {
    #[test]
    fn generation_is_deterministic(roster in arb_roster()) {
        let mut a = build(&roster);
        let mut b = build(&roster);
        a.generate(&range()).unwrap();
        b.generate(&range()).unwrap();
        prop_assert_eq!(a.document(), b.document());
    }

    #[test]
    fn balances_match_held_weights(roster in arb_roster()) {
        let mut s = build(&roster);
        let report = s.generate(&range()).unwrap();
        prop_assert_eq!(report.filled_slots, s.schedule().len());
        prop_assert_eq!(
            report.required_slots,
            report.filled_slots + s.schedule().unfilled().len()
        );
        for e in s.employees() {
            let held: f64 = s.schedule().assignments_of(&e.id).map(|a| a.weight).sum();
            prop_assert!((s.schedule().balance().get(&e.id) - held).abs() < 1e-9);
        }
    }

    #[test]
    fn nobody_holds_a_slot_they_cannot_take(roster in arb_roster()) {
        let mut s = build(&roster);
        s.generate(&range()).unwrap();
        let bad = s
            .detect_conflicts()
            .into_iter()
            .filter(|c| matches!(c.kind, ConflictKind::Blocked | ConflictKind::Sabbath))
            .count();
        prop_assert_eq!(bad, 0);
    }

    #[test]
    fn swap_is_atomic_and_self_inverse(
        roster in arb_roster(),
        i in any::<prop::sample::Index>(),
        j in any::<prop::sample::Index>(),
    ) {
        // Sans la contrainte « un créneau par jour », l'échange inverse est toujours admis.
        let config = EngineConfig {
            prefer_distinct_same_day: false,
            ..EngineConfig::default()
        };
        let mut s = build_with(&roster, config);
        s.generate(&range()).unwrap();
        let keys: Vec<AssignmentKey> = s.schedule().assignments().map(|a| a.key).collect();
        prop_assume!(!keys.is_empty());
        let (k1, k2) = (*i.get(&keys), *j.get(&keys));

        let before = s.document();
        let balance = s.schedule().balance().clone();
        match s.swap(k1.date, k1.duty, k2.date, k2.duty) {
            Ok(()) => {
                s.swap(k1.date, k1.duty, k2.date, k2.duty).unwrap();
                prop_assert_eq!(s.document(), before);
                for (id, points) in balance.total() {
                    prop_assert!((s.schedule().balance().get(id) - points).abs() < 1e-9);
                }
            }
            Err(err) => {
                prop_assert!(matches!(err, SchedError::SwapConflict(_)));
                prop_assert_eq!(s.document(), before);
                prop_assert_eq!(s.schedule().balance(), &balance);
            }
        }
    }
}
