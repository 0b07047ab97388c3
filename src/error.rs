use crate::calendar::InvalidDateError;
use crate::task::TaskId;
use crate::task_validation::TaskValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    InvalidDate(#[from] InvalidDateError),

    #[error("unknown dependency type '{0}' (expected FS, SS, FF or SF)")]
    UnknownDependencyType(String),

    #[error("dependency {predecessor_id} -> {successor_id} would create a cycle")]
    DependencyCycle {
        predecessor_id: TaskId,
        successor_id: TaskId,
    },

    #[error("task {0} not found")]
    UnknownTask(TaskId),

    #[error(transparent)]
    InvalidTask(#[from] TaskValidationError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
