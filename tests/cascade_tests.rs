use chrono::NaiveDate;
use schedule_engine::{
    DateRange, Dependency, DependencyType, ScheduleError, Task, apply_date_updates,
    cascade_changes, ensure_dependency_no_cycle, recalculate_task_dates,
    validate_dependency_no_cycle,
};
use std::collections::HashMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn jan(day: u32) -> NaiveDate {
    d(2024, 1, day)
}

fn chain() -> Vec<Task> {
    vec![
        Task::new("A", "Design", jan(1), jan(2)),
        Task::new("B", "Build", jan(3), jan(5)).with_dependency(Dependency::finish_to_start("A")),
        Task::new("C", "Ship", jan(6), jan(6)).with_dependency(Dependency::finish_to_start("B")),
    ]
}

fn move_task(tasks: &mut [Task], id: &str, start: NaiveDate, end: NaiveDate) {
    let task = tasks.iter_mut().find(|t| t.id == id).unwrap();
    task.start_date = start;
    task.end_date = end;
}

#[test]
fn moving_a_task_pushes_every_transitive_successor() {
    let mut tasks = chain();
    move_task(&mut tasks, "A", jan(5), jan(6));

    let updates = recalculate_task_dates("A", &tasks);
    assert_eq!(updates.len(), 2);
    assert_eq!(updates["B"], DateRange::new(jan(7), jan(9)));
    assert_eq!(updates["C"], DateRange::new(jan(10), jan(10)));
    assert!(!updates.contains_key("A"));
}

#[test]
fn settled_graph_yields_no_updates_on_second_run() {
    let mut tasks = chain();
    move_task(&mut tasks, "A", jan(5), jan(6));

    let first = recalculate_task_dates("A", &tasks);
    assert!(!first.is_empty());
    let settled = apply_date_updates(&tasks, &first);

    let second = recalculate_task_dates("A", &settled);
    assert!(second.is_empty(), "expected no updates, got {second:?}");
}

#[test]
fn unchanged_successors_are_omitted() {
    let tasks = chain();
    assert!(recalculate_task_dates("A", &tasks).is_empty());
}

#[test]
fn unknown_changed_task_yields_nothing() {
    let tasks = chain();
    assert!(recalculate_task_dates("missing", &tasks).is_empty());
}

#[test]
fn latest_predecessor_constraint_wins() {
    // FS constraints put the successor at day 10 and day 15.
    let tasks = vec![
        Task::new("P1", "Short", jan(1), jan(9)),
        Task::new("P2", "Long", jan(1), jan(14)),
        Task::new("S", "Join", jan(1), jan(2))
            .with_dependency(Dependency::finish_to_start("P1"))
            .with_dependency(Dependency::finish_to_start("P2")),
    ];

    let updates = recalculate_task_dates("P1", &tasks);
    assert_eq!(updates["S"], DateRange::new(jan(15), jan(16)));
}

#[test]
fn diamond_join_waits_for_both_branches() {
    let mut tasks = vec![
        Task::new("A", "Kickoff", jan(1), jan(1)),
        Task::new("B", "Short branch", jan(2), jan(3))
            .with_dependency(Dependency::finish_to_start("A")),
        Task::new("C", "Long branch", jan(2), jan(6))
            .with_dependency(Dependency::finish_to_start("A")),
        Task::new("D", "Merge", jan(7), jan(7))
            .with_dependency(Dependency::finish_to_start("B"))
            .with_dependency(Dependency::finish_to_start("C")),
    ];
    move_task(&mut tasks, "A", jan(3), jan(3));

    let updates = recalculate_task_dates("A", &tasks);
    assert_eq!(updates["B"], DateRange::new(jan(4), jan(5)));
    assert_eq!(updates["C"], DateRange::new(jan(4), jan(8)));
    assert_eq!(updates["D"], DateRange::new(jan(9), jan(9)));
}

#[test]
fn lagged_start_to_start_dependency_is_respected() {
    let mut tasks = vec![
        Task::new("A", "Pour", jan(1), jan(4)),
        Task::new("B", "Cure", jan(3), jan(5)).with_dependency(Dependency::new(
            "A",
            DependencyType::StartToStart,
            2,
        )),
    ];
    move_task(&mut tasks, "A", jan(10), jan(13));

    let updates = recalculate_task_dates("A", &tasks);
    assert_eq!(updates["B"], DateRange::new(jan(12), jan(14)));
}

#[test]
fn dangling_predecessors_are_ignored() {
    let mut tasks = chain();
    tasks[1].dependencies.push(Dependency::finish_to_start("ghost"));
    move_task(&mut tasks, "A", jan(5), jan(6));

    let updates = recalculate_task_dates("A", &tasks);
    assert_eq!(updates["B"], DateRange::new(jan(7), jan(9)));
}

#[test]
fn cyclic_graph_still_terminates() {
    let tasks = vec![
        Task::new("A", "Left", jan(1), jan(2)).with_dependency(Dependency::finish_to_start("B")),
        Task::new("B", "Right", jan(1), jan(1)).with_dependency(Dependency::finish_to_start("A")),
    ];

    let updates = recalculate_task_dates("A", &tasks);
    assert_eq!(updates["B"], DateRange::new(jan(3), jan(3)));
    assert!(!updates.contains_key("A"));
}

#[test]
fn cascade_changes_carry_previous_dates_sorted_by_id() {
    let mut tasks = chain();
    move_task(&mut tasks, "A", jan(5), jan(6));

    let changes = cascade_changes("A", &tasks);
    let ids: Vec<&str> = changes.iter().map(|c| c.task_id.as_str()).collect();
    assert_eq!(ids, ["B", "C"]);
    assert_eq!(changes[0].previous, DateRange::new(jan(3), jan(5)));
    assert_eq!(changes[0].updated, DateRange::new(jan(7), jan(9)));
}

#[test]
fn applying_updates_leaves_input_and_durations_alone() {
    let tasks = chain();
    let updates: HashMap<String, DateRange> =
        [("B".to_string(), DateRange::new(jan(20), jan(22)))]
            .into_iter()
            .collect();

    let updated = apply_date_updates(&tasks, &updates);
    assert_eq!(tasks[1].start_date, jan(3));
    assert_eq!(updated[1].start_date, jan(20));
    assert_eq!(updated[1].end_date, jan(22));
    assert_eq!(updated[1].duration_days, 3);
    assert_eq!(updated[0], tasks[0]);
}

#[test]
fn self_dependency_is_never_valid() {
    let tasks = chain();
    for task in &tasks {
        assert!(!validate_dependency_no_cycle(&task.id, &task.id, &tasks));
    }
}

#[test]
fn closing_an_existing_path_is_rejected() {
    let tasks = chain();
    assert!(!validate_dependency_no_cycle("B", "A", &tasks));
    assert!(!validate_dependency_no_cycle("C", "A", &tasks));
    assert!(validate_dependency_no_cycle("A", "C", &tasks));
}

#[test]
fn ensure_reports_unknown_tasks_and_cycles() {
    let tasks = chain();
    assert!(ensure_dependency_no_cycle("A", "C", &tasks).is_ok());
    assert!(matches!(
        ensure_dependency_no_cycle("A", "Z", &tasks),
        Err(ScheduleError::UnknownTask(id)) if id == "Z"
    ));
    assert!(matches!(
        ensure_dependency_no_cycle("C", "A", &tasks),
        Err(ScheduleError::DependencyCycle { predecessor_id, successor_id })
            if predecessor_id == "C" && successor_id == "A"
    ));
}

#[test]
fn lag_beyond_the_calendar_pins_successors_to_the_last_date() {
    let mut tasks = chain();
    tasks[1].dependencies = vec![Dependency::new("A", DependencyType::FinishToStart, 200_000_000)];

    let updates = recalculate_task_dates("A", &tasks);
    assert_eq!(updates["B"], DateRange::new(NaiveDate::MAX, NaiveDate::MAX));
    assert_eq!(updates["C"], DateRange::new(NaiveDate::MAX, NaiveDate::MAX));
}
