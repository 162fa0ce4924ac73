pub mod aggregate;
pub mod card;
pub mod catalog;
pub mod chart;
pub mod error;
pub mod metadata;
pub mod selection;

pub use catalog::MetricCatalog;
pub use error::{KpiError, KpiResult};
