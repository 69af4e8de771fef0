use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// Rolling window outside the slider range.
    #[error("rolling window must be within 1..=14, got {0}")]
    InvalidWindow(u32),

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("unknown metric: {0}")]
    InvalidMetric(String),

    #[error("unknown method: {0}")]
    InvalidMethod(String),

    /// No record store could be supplied; fatal before any panel exists.
    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error("panel {index} does not exist (dashboard has {len})")]
    PanelIndex { index: usize, len: usize },
}
