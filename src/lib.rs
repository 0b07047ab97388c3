pub mod calculations;
pub mod calendar;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod snapshot;
pub mod task;
pub mod task_validation;

pub use calculations::cascade::{
    DateChange, apply_date_updates, cascade_changes, ensure_dependency_no_cycle,
    recalculate_task_dates, validate_dependency_no_cycle,
};
pub use calculations::critical_path::{
    CriticalPathResult, ScheduleInfo, ScheduleSummary, calculate_critical_path,
    calculate_critical_path_detailed,
};
pub use calculations::dependency_dates::{
    calculate_successor_dates, calculate_successor_dates_str,
};
pub use calendar::{InvalidDateError, InvalidDateKind};
pub use config::{DependencyTypePolicy, EngineConfig};
pub use conflicts::{
    ConflictInfo, ConflictPair, ProjectTask, conflict_report, date_ranges_overlap,
    detect_employee_conflicts, get_all_employee_conflicts, has_employee_conflict,
};
pub use error::{ScheduleError, ScheduleResult};
pub use snapshot::{
    SnapshotError, TaskRecord, load_tasks_from_csv, load_tasks_from_json, save_schedule_to_csv,
    save_schedule_to_json, save_tasks_to_json,
};
pub use task::{Assignment, DateRange, Dependency, DependencyType, EmployeeId, Task, TaskId};
pub use task_validation::TaskValidationError;
