#![forbid(unsafe_code)]
use chrono::NaiveDate;
use permanence::{
    prepare_swap_notices, AssignmentKey, DateRange, DutyType, Employee, EmployeeId, EngineConfig,
    SchedError, ScheduleState, Scheduler, TextNotice,
};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
}

fn owner(s: &Scheduler, day: u32, duty: DutyType) -> String {
    s.schedule()
        .get(&AssignmentKey::new(d(day), duty))
        .unwrap()
        .employee
        .to_string()
}

fn points(s: &Scheduler, who: &str) -> f64 {
    s.schedule().balance().get(&EmployeeId::new(who))
}

/// Alice bloquée le 2 septembre ; semaine du 1er au 7.
fn generated() -> Scheduler {
    let mut alice = Employee::new("Alice", "alice@example.com");
    alice.block_day(d(2));
    let bob = Employee::new("Bob", "bob@example.com");
    let mut s = Scheduler::new(vec![alice, bob], &[], EngineConfig::default()).unwrap();
    s.generate(&DateRange::span(d(1), d(7))).unwrap();
    s
}

#[test]
fn baseline_assignments() {
    let s = generated();
    assert_eq!(owner(&s, 1, DutyType::Weekday), "Alice");
    assert_eq!(owner(&s, 2, DutyType::Weekday), "Bob");
    assert_eq!(owner(&s, 3, DutyType::Weekday), "Alice");
    assert_eq!(owner(&s, 4, DutyType::Thursday), "Bob");
    assert_eq!(points(&s, "Alice"), 5.5);
    assert_eq!(points(&s, "Bob"), 5.0);
}

#[test]
fn swap_onto_a_blocked_day_is_rejected_without_mutation() {
    let mut s = generated();
    let before = s.document();
    let balance_before = s.schedule().balance().clone();

    let err = s
        .swap(d(1), DutyType::Weekday, d(2), DutyType::Weekday)
        .unwrap_err();
    assert!(matches!(err, SchedError::SwapConflict(ref m) if m.contains("Alice")));

    assert_eq!(s.document(), before);
    assert_eq!(s.schedule().balance(), &balance_before);
    assert_eq!(owner(&s, 1, DutyType::Weekday), "Alice");
    assert_eq!(owner(&s, 2, DutyType::Weekday), "Bob");
    assert_eq!(s.schedule().state(), ScheduleState::Generated);
}

#[test]
fn swap_corrects_balances_and_twice_restores_everything() {
    let mut s = generated();
    let before = s.document();
    let balance_before = s.schedule().balance().clone();

    s.swap(d(3), DutyType::Weekday, d(4), DutyType::Thursday)
        .unwrap();
    assert_eq!(owner(&s, 3, DutyType::Weekday), "Bob");
    assert_eq!(owner(&s, 4, DutyType::Thursday), "Alice");
    assert_eq!(points(&s, "Alice"), 6.0);
    assert_eq!(points(&s, "Bob"), 4.5);
    assert_eq!(s.schedule().state(), ScheduleState::Swapped);

    s.swap(d(3), DutyType::Weekday, d(4), DutyType::Thursday)
        .unwrap();
    assert_eq!(s.document(), before);
    assert_eq!(s.schedule().balance(), &balance_before);
}

#[test]
fn unknown_keys_are_validation_errors() {
    let mut s = generated();
    let err = s
        .swap(d(1), DutyType::Weekend, d(2), DutyType::Weekday)
        .unwrap_err();
    assert!(matches!(err, SchedError::Validation { .. }));
}

#[test]
fn swap_cannot_double_book_a_day() {
    let mut s = generated();
    // Bob tient WE le 6 et B le 5 ; Alice tient WE le 5 et B le 6.
    assert_eq!(owner(&s, 5, DutyType::Backup), "Bob");
    assert_eq!(owner(&s, 6, DutyType::Weekend), "Bob");
    let err = s
        .swap(d(5), DutyType::Backup, d(6), DutyType::Backup)
        .unwrap_err();
    assert!(matches!(err, SchedError::SwapConflict(_)));
}

#[test]
fn swapping_within_a_day_is_allowed() {
    let mut s = generated();
    s.swap(d(5), DutyType::Weekend, d(5), DutyType::Backup)
        .unwrap();
    assert_eq!(owner(&s, 5, DutyType::Weekend), "Bob");
    assert_eq!(owner(&s, 5, DutyType::Backup), "Alice");
    assert_eq!(points(&s, "Alice"), 4.0);
    assert_eq!(points(&s, "Bob"), 6.5);
}

#[test]
fn sabbath_blocks_swaps_onto_weekend_slots() {
    let mut s = Scheduler::new(
        vec![
            Employee::new("Alice", ""),
            Employee::new("Carol", "").observing_sabbath(),
        ],
        &[],
        EngineConfig::default(),
    )
    .unwrap();
    s.generate(&DateRange::span(d(1), d(6))).unwrap();
    assert_eq!(owner(&s, 2, DutyType::Weekday), "Carol");
    assert_eq!(owner(&s, 5, DutyType::Weekend), "Alice");

    let err = s
        .swap(d(2), DutyType::Weekday, d(5), DutyType::Weekend)
        .unwrap_err();
    assert!(matches!(err, SchedError::SwapConflict(ref m) if m.contains("sabbath")));
}

#[test]
fn no_swap_after_export() {
    let mut s = generated();
    s.export().unwrap();
    let err = s
        .swap(d(3), DutyType::Weekday, d(4), DutyType::Thursday)
        .unwrap_err();
    assert!(matches!(err, SchedError::InvalidState { state: ScheduleState::Exported, .. }));
}

#[test]
fn notices_describe_the_new_slots() {
    let mut s = generated();
    s.swap(d(3), DutyType::Weekday, d(4), DutyType::Thursday)
        .unwrap();
    let notices = prepare_swap_notices(
        &s,
        AssignmentKey::new(d(3), DutyType::Weekday),
        AssignmentKey::new(d(4), DutyType::Thursday),
        &TextNotice,
    )
    .unwrap();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].email, "bob@example.com");
    assert!(notices[0]
        .content
        .contains("You now hold WD on 2025-09-03 (previously Th on 2025-09-04)"));
    assert!(notices[1].content.starts_with("Hello Alice,"));
}

#[test]
fn restored_schedule_matches_the_generated_one() {
    let s = generated();
    let doc = s.document();

    let mut alice = Employee::new("Alice", "alice@example.com");
    alice.block_day(d(2));
    let mut restored = Scheduler::new(
        vec![alice, Employee::new("Bob", "bob@example.com")],
        &[],
        EngineConfig::default(),
    )
    .unwrap();
    restored.restore(&doc).unwrap();

    assert_eq!(restored.schedule().state(), ScheduleState::Generated);
    assert_eq!(restored.schedule().balance(), s.schedule().balance());
    assert_eq!(restored.document(), doc);
    assert!(restored.detect_conflicts().is_empty());
}

#[test]
fn conflicts_flag_blocks_added_after_generation() {
    let doc = generated().document();

    let mut bob = Employee::new("Bob", "");
    bob.block_day(d(4));
    let mut s = Scheduler::new(
        vec![Employee::new("Alice", ""), bob],
        &[],
        EngineConfig::default(),
    )
    .unwrap();
    s.restore(&doc).unwrap();

    let conflicts = s.detect_conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].key, AssignmentKey::new(d(4), DutyType::Thursday));
    assert_eq!(conflicts[0].kind, permanence::ConflictKind::Blocked);
}

#[test]
fn exported_schedule_stays_exported_after_restore() {
    let mut s = generated();
    s.export().unwrap();
    let doc = s.document();
    assert!(doc.exported);

    let mut alice = Employee::new("Alice", "alice@example.com");
    alice.block_day(d(2));
    let mut restored = Scheduler::new(
        vec![alice, Employee::new("Bob", "bob@example.com")],
        &[],
        EngineConfig::default(),
    )
    .unwrap();
    restored.restore(&doc).unwrap();
    assert_eq!(restored.schedule().state(), ScheduleState::Exported);

    let err = restored
        .swap(d(3), DutyType::Weekday, d(4), DutyType::Thursday)
        .unwrap_err();
    assert!(matches!(err, SchedError::InvalidState { action: "swap", .. }));
    assert_eq!(restored.document(), doc);
}

#[test]
fn swapping_two_slots_of_one_employee_sends_no_notice() {
    let mut s = generated();
    assert_eq!(owner(&s, 1, DutyType::Weekday), "Alice");
    assert_eq!(owner(&s, 3, DutyType::Weekday), "Alice");
    s.swap(d(1), DutyType::Weekday, d(3), DutyType::Weekday)
        .unwrap();

    let notices = prepare_swap_notices(
        &s,
        AssignmentKey::new(d(1), DutyType::Weekday),
        AssignmentKey::new(d(3), DutyType::Weekday),
        &TextNotice,
    )
    .unwrap();
    assert!(notices.is_empty());
}
