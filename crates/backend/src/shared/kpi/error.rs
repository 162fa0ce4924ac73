use contracts::shared::kpi::KpiId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KpiError {
    #[error("metric not found: {0}")]
    UnknownKpi(KpiId),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Recovered locally; never leaves the chart dispatcher.
    #[error("no data: {0}")]
    NoData(String),
}

pub type KpiResult<T> = Result<T, KpiError>;
