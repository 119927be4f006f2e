/// Errors raised by the scheduling pipeline.
///
/// "No slot found" is deliberately absent: an empty candidate set is a normal
/// outcome and surfaces as `None` from the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Event source error: {0}")]
    EventSource(String),
}

pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
