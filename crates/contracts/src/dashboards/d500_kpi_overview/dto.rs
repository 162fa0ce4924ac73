use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::kpi::{
    BusinessUnit, CardView, ChartSpec, FilterContext, KpiId, Month, Perspective,
};

/// Identifier of one dashboard session held by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One discrete user interaction reported by the render surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    SetMonth {
        month: Month,
    },
    SetBusinessUnit {
        business_unit: BusinessUnit,
    },
    /// Card click: expands the KPI, or collapses it when already expanded.
    SelectKpi {
        perspective: Perspective,
        kpi_id: KpiId,
    },
    /// Subdivision picker under an expanded KPI.
    ChooseSubdivision {
        perspective: Perspective,
        subdivision: String,
    },
    ClearAll,
    /// Regenerate the dataset and drop cached aggregates.
    Refresh,
}

/// Provenance of the dataset the view was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
}

/// Detail area under a perspective group with an expanded KPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedView {
    pub kpi_id: KpiId,
    pub subdivision: String,
    /// Choices for the subdivision picker.
    pub subdivisions: Vec<String>,
    pub chart: ChartSpec,
}

/// One perspective group: its cards and, optionally, the detail chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub perspective: Perspective,
    pub label: String,
    pub columns: u8,
    pub cards: Vec<CardView>,
    pub expanded: Option<ExpandedView>,
    /// User-visible message when this group failed to render its chart.
    pub error: Option<String>,
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// e.g. "KPI Dashboard - BU1"
    pub title: String,
    /// e.g. "January"
    pub subtitle: String,
    pub filter: FilterContext,
    pub dataset: DatasetInfo,
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub view: DashboardView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
