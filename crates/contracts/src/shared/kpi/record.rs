use serde::{Deserialize, Serialize};
use std::fmt;

use super::Perspective;

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusinessUnit {
    #[serde(rename = "BU1")]
    Bu1,
    #[serde(rename = "BU2")]
    Bu2,
    #[serde(rename = "BU3")]
    Bu3,
}

impl BusinessUnit {
    pub const ALL: [BusinessUnit; 3] = [BusinessUnit::Bu1, BusinessUnit::Bu2, BusinessUnit::Bu3];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessUnit::Bu1 => "BU1",
            BusinessUnit::Bu2 => "BU2",
            BusinessUnit::Bu3 => "BU3",
        }
    }
}

impl fmt::Display for BusinessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting month. The set is closed and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
}

impl Month {
    pub const ALL: [Month; 6] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
        }
    }

    /// Zero-based position in [`Month::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn previous(&self) -> Option<Month> {
        self.index().checked_sub(1).map(|i| Month::ALL[i])
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subdivision codes a KPI may be tracked for.
pub mod subdivisions {
    pub const PRODEV: &str = "PRODEV";
    pub const DOCS: &str = "DOCS";
    pub const ITS: &str = "ITS";

    pub const ALL: [&str; 3] = [PRODEV, DOCS, ITS];
}

/// Current viewing context. Every aggregate and chart takes it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterContext {
    pub business_unit: BusinessUnit,
    pub month: Month,
}

impl FilterContext {
    pub fn new(business_unit: BusinessUnit, month: Month) -> Self {
        Self {
            business_unit,
            month,
        }
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new(BusinessUnit::Bu1, Month::January)
    }
}

// ---------------------------------------------------------------------------
// Dataset rows
// ---------------------------------------------------------------------------

/// One row of the underlying dataset: a (BU, month, subdivision) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub business_unit: BusinessUnit,
    pub month: Month,
    pub subdivision: String,

    // Financial
    pub revenue: f64,
    pub target: f64,
    pub cost: f64,
    pub projects: f64,
    pub gross_margin: f64,

    // Customer & Service
    pub csat: f64,
    pub response_hours: f64,
    pub first_contact_resolution: f64,

    // Quality
    pub defect_rate: f64,
    pub uptime: f64,
    pub rework_rate: f64,

    // Employee
    pub engagement: f64,
    pub attrition_rate: f64,
    pub training_hours: f64,
}

impl AggregateRecord {
    /// Empty row for the given cell; all measures zero.
    pub fn new(business_unit: BusinessUnit, month: Month, subdivision: &str) -> Self {
        Self {
            business_unit,
            month,
            subdivision: subdivision.to_string(),
            revenue: 0.0,
            target: 0.0,
            cost: 0.0,
            projects: 0.0,
            gross_margin: 0.0,
            csat: 0.0,
            response_hours: 0.0,
            first_contact_resolution: 0.0,
            defect_rate: 0.0,
            uptime: 0.0,
            rework_rate: 0.0,
            engagement: 0.0,
            attrition_rate: 0.0,
            training_hours: 0.0,
        }
    }

    pub fn matches(&self, ctx: &FilterContext) -> bool {
        self.business_unit == ctx.business_unit && self.month == ctx.month
    }
}

/// How a field collapses over several rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    Sum,
    Mean,
}

/// Numeric fields of [`AggregateRecord`], each with its domain and policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Revenue,
    Target,
    Cost,
    Projects,
    GrossMargin,
    Csat,
    ResponseHours,
    FirstContactResolution,
    DefectRate,
    Uptime,
    ReworkRate,
    Engagement,
    AttritionRate,
    TrainingHours,
}

impl MetricField {
    pub const ALL: [MetricField; 14] = [
        MetricField::Revenue,
        MetricField::Target,
        MetricField::Cost,
        MetricField::Projects,
        MetricField::GrossMargin,
        MetricField::Csat,
        MetricField::ResponseHours,
        MetricField::FirstContactResolution,
        MetricField::DefectRate,
        MetricField::Uptime,
        MetricField::ReworkRate,
        MetricField::Engagement,
        MetricField::AttritionRate,
        MetricField::TrainingHours,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricField::Revenue => "revenue",
            MetricField::Target => "target",
            MetricField::Cost => "cost",
            MetricField::Projects => "projects",
            MetricField::GrossMargin => "gross_margin",
            MetricField::Csat => "csat",
            MetricField::ResponseHours => "response_hours",
            MetricField::FirstContactResolution => "first_contact_resolution",
            MetricField::DefectRate => "defect_rate",
            MetricField::Uptime => "uptime",
            MetricField::ReworkRate => "rework_rate",
            MetricField::Engagement => "engagement",
            MetricField::AttritionRate => "attrition_rate",
            MetricField::TrainingHours => "training_hours",
        }
    }

    pub fn domain(&self) -> Perspective {
        match self {
            MetricField::Revenue
            | MetricField::Target
            | MetricField::Cost
            | MetricField::Projects
            | MetricField::GrossMargin => Perspective::Financial,
            MetricField::Csat
            | MetricField::ResponseHours
            | MetricField::FirstContactResolution => Perspective::Customer,
            MetricField::DefectRate | MetricField::Uptime | MetricField::ReworkRate => {
                Perspective::Quality
            }
            MetricField::Engagement | MetricField::AttritionRate | MetricField::TrainingHours => {
                Perspective::Employee
            }
        }
    }

    /// Additive amounts are summed, rates and scores are averaged.
    pub fn policy(&self) -> AggregationPolicy {
        match self {
            MetricField::Revenue
            | MetricField::Target
            | MetricField::Cost
            | MetricField::Projects
            | MetricField::TrainingHours => AggregationPolicy::Sum,
            _ => AggregationPolicy::Mean,
        }
    }

    pub fn value_of(&self, record: &AggregateRecord) -> f64 {
        match self {
            MetricField::Revenue => record.revenue,
            MetricField::Target => record.target,
            MetricField::Cost => record.cost,
            MetricField::Projects => record.projects,
            MetricField::GrossMargin => record.gross_margin,
            MetricField::Csat => record.csat,
            MetricField::ResponseHours => record.response_hours,
            MetricField::FirstContactResolution => record.first_contact_resolution,
            MetricField::DefectRate => record.defect_rate,
            MetricField::Uptime => record.uptime,
            MetricField::ReworkRate => record.rework_rate,
            MetricField::Engagement => record.engagement,
            MetricField::AttritionRate => record.attrition_rate,
            MetricField::TrainingHours => record.training_hours,
        }
    }

    pub fn for_domain(domain: Perspective) -> impl Iterator<Item = MetricField> {
        Self::ALL.into_iter().filter(move |f| f.domain() == domain)
    }
}

/// Metrics computed from already aggregated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedMetric {
    /// `(revenue / target - 1) * 100`
    RevenueVsTarget,
    /// `cost / projects`
    CostPerProject,
}

impl DerivedMetric {
    pub const ALL: [DerivedMetric; 2] = [DerivedMetric::RevenueVsTarget, DerivedMetric::CostPerProject];

    pub fn key(&self) -> &'static str {
        match self {
            DerivedMetric::RevenueVsTarget => "revenue_vs_target",
            DerivedMetric::CostPerProject => "cost_per_project",
        }
    }

    pub fn domain(&self) -> Perspective {
        match self {
            DerivedMetric::RevenueVsTarget | DerivedMetric::CostPerProject => {
                Perspective::Financial
            }
        }
    }

    /// `(numerator, denominator)` fields the metric is computed from.
    pub fn operands(&self) -> (MetricField, MetricField) {
        match self {
            DerivedMetric::RevenueVsTarget => (MetricField::Revenue, MetricField::Target),
            DerivedMetric::CostPerProject => (MetricField::Cost, MetricField::Projects),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_order_and_previous() {
        assert_eq!(Month::January.previous(), None);
        assert_eq!(Month::June.previous(), Some(Month::May));
        assert_eq!(Month::March.index(), 2);
    }

    #[test]
    fn test_business_unit_wire_codes() {
        let json = serde_json::to_string(&BusinessUnit::Bu2).unwrap();
        assert_eq!(json, "\"BU2\"");
        let bu: BusinessUnit = serde_json::from_str("\"BU3\"").unwrap();
        assert_eq!(bu, BusinessUnit::Bu3);
    }

    #[test]
    fn test_every_domain_has_fields() {
        for p in Perspective::ALL {
            assert!(MetricField::for_domain(p).count() > 0, "{p} has no fields");
        }
    }

    #[test]
    fn test_additive_fields_are_summed() {
        assert_eq!(MetricField::Revenue.policy(), AggregationPolicy::Sum);
        assert_eq!(MetricField::TrainingHours.policy(), AggregationPolicy::Sum);
        assert_eq!(MetricField::Csat.policy(), AggregationPolicy::Mean);
        assert_eq!(MetricField::Uptime.policy(), AggregationPolicy::Mean);
    }
}
