use serde::{Deserialize, Serialize};
use std::fmt;

mod record;

pub use record::*;

// ---------------------------------------------------------------------------
// KPI identity & catalogue metadata
// ---------------------------------------------------------------------------

/// Stable KPI identifier, used as catalogue key and in selection events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiId(pub String);

impl KpiId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KpiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Perspective group of KPI cards. Also the data domain a KPI reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    Financial,
    Customer,
    Quality,
    Employee,
}

impl Perspective {
    /// Display order of the perspective groups.
    pub const ALL: [Perspective; 4] = [
        Perspective::Financial,
        Perspective::Customer,
        Perspective::Quality,
        Perspective::Employee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::Financial => "financial",
            Perspective::Customer => "customer",
            Perspective::Quality => "quality",
            Perspective::Employee => "employee",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Perspective::Financial => "Financial",
            Perspective::Customer => "Customer & Service",
            Perspective::Quality => "Quality",
            Perspective::Employee => "Employee",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether higher or lower values represent an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Display unit of a KPI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueUnit {
    /// Currency amount shown in thousands, e.g. `$1,234K`.
    CurrencyThousands,
    Percentage,
    /// Score on a fixed scale, e.g. `4.2/5`.
    RatioOutOf { scale: u8 },
    Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStyle {
    Line,
    Bar,
}

/// Chart shape declared per KPI in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    /// Time series across all months.
    Trend { style: TrendStyle },
    /// Point-in-time value against its target.
    Gauge,
    /// Point-in-time two-part split.
    PartOfWhole,
    /// Plain per-month table.
    Default,
}

impl ChartKind {
    /// Point-in-time charts narrow to the filter month.
    pub fn is_point_in_time(&self) -> bool {
        matches!(self, ChartKind::Gauge | ChartKind::PartOfWhole)
    }
}

/// Where a KPI's scalar comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum KpiSource {
    Field(MetricField),
    Derived(DerivedMetric),
}

/// Static definition of one KPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub kpi_id: KpiId,
    pub display_name: String,
    pub domain: Perspective,
    /// Subdivision codes the KPI is tracked for. Never empty.
    pub applicable_subdivisions: Vec<String>,
    pub polarity: Polarity,
    pub unit: ValueUnit,
    pub chart_kind: ChartKind,
    pub source: KpiSource,
    pub description: Option<String>,
}

impl KpiDefinition {
    pub fn tracks_subdivision(&self, subdivision: &str) -> bool {
        self.applicable_subdivisions.iter().any(|s| s == subdivision)
    }
}

/// Metadata for one perspective group rendered as a card grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveMeta {
    pub perspective: Perspective,
    pub label: String,
    pub kpis: Vec<KpiId>,
    /// Number of columns in the card grid.
    pub columns: u8,
}

/// Full catalogue returned by the metadata endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiCatalogResponse {
    pub kpis: Vec<KpiDefinition>,
    pub perspectives: Vec<PerspectiveMeta>,
}

// ---------------------------------------------------------------------------
// Card view
// ---------------------------------------------------------------------------

/// Semantic outcome of a change, taking polarity into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarityClass {
    Improved,
    Worsened,
    Neutral,
}

/// Raw direction of a change (arrow), independent of polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// A single rendered KPI card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub kpi_id: KpiId,
    pub title: String,
    /// Formatted value, e.g. `$1,234K` or `92.5%`.
    pub display_text: String,
    /// Formatted change, e.g. `+4.0%`, `-1.5%`, `0%`.
    pub change_text: String,
    pub trend: TrendDirection,
    pub polarity_class: PolarityClass,
    /// `false` when the filtered data set was empty and the value is a placeholder zero.
    pub has_data: bool,
}

// ---------------------------------------------------------------------------
// Chart spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

/// Library-neutral description of a detail chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Trend {
        kpi_id: KpiId,
        title: String,
        style: TrendStyle,
        unit: ValueUnit,
        points: Vec<SeriesPoint>,
    },
    Gauge {
        kpi_id: KpiId,
        title: String,
        month: Month,
        actual: f64,
        target: f64,
        achievement_pct: f64,
    },
    PartOfWhole {
        kpi_id: KpiId,
        title: String,
        month: Month,
        slices: Vec<Slice>,
    },
    Table {
        kpi_id: KpiId,
        title: String,
        unit: ValueUnit,
        rows: Vec<SeriesPoint>,
    },
    /// Placeholder when the selection has no usable data.
    EmptySeries {
        kpi_id: KpiId,
        title: String,
        reason: String,
    },
}

impl ChartSpec {
    pub fn kpi_id(&self) -> &KpiId {
        match self {
            ChartSpec::Trend { kpi_id, .. }
            | ChartSpec::Gauge { kpi_id, .. }
            | ChartSpec::PartOfWhole { kpi_id, .. }
            | ChartSpec::Table { kpi_id, .. }
            | ChartSpec::EmptySeries { kpi_id, .. } => kpi_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartSpec::EmptySeries { .. })
    }
}
