use thiserror::Error;

/// Problems with the grid configuration. Raised before any grid is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No days configured")]
    NoDays,
    #[error("{0} days configured, the maximum is {max}", max = crate::data::MAX_DAYS)]
    TooManyDays(usize),
    #[error("Lessons per day must be at least 1")]
    NoPeriods,
    #[error("Lessons per day is {0}, the maximum is {max}", max = crate::data::MAX_PERIODS_PER_DAY)]
    TooManyPeriods(usize),
    #[error("No classes configured")]
    NoClasses,
    #[error("{0} classes configured, the maximum is {max}", max = crate::data::MAX_CLASSES)]
    TooManyClasses(usize),
    #[error("Blank {0} label")]
    BlankLabel(&'static str),
    #[error("Duplicate day: {0}")]
    DuplicateDay(String),
    #[error("Duplicate class: {0}")]
    DuplicateClass(String),
}
