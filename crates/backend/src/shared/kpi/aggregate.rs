//! Filtered aggregation of dataset rows into per-domain scalars.
//!
//! No-data policy: when the filter matches no rows, every field and derived
//! metric is `0.0` and `record_count` is `0`. Callers use [`DomainAggregate::has_data`]
//! to tell a placeholder zero from a real one.

use contracts::shared::kpi::*;
use std::collections::BTreeMap;

/// Aggregated scalars of one domain for one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainAggregate {
    pub domain: Perspective,
    pub record_count: usize,
    fields: BTreeMap<MetricField, f64>,
    derived: BTreeMap<DerivedMetric, f64>,
}

impl DomainAggregate {
    pub fn field(&self, field: MetricField) -> f64 {
        self.fields.get(&field).copied().unwrap_or(0.0)
    }

    pub fn derived(&self, metric: DerivedMetric) -> f64 {
        self.derived.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn has_data(&self) -> bool {
        self.record_count > 0
    }

    /// Field name -> scalar, including derived metrics.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        self.fields
            .iter()
            .map(|(f, v)| (f.key(), *v))
            .chain(self.derived.iter().map(|(d, v)| (d.key(), *v)))
            .collect()
    }
}

/// Aggregate the rows matching `ctx` (BU + month) for `domain`.
pub fn aggregate(
    records: &[AggregateRecord],
    domain: Perspective,
    ctx: &FilterContext,
) -> DomainAggregate {
    let rows: Vec<&AggregateRecord> = records.iter().filter(|r| r.matches(ctx)).collect();
    aggregate_rows(&rows, domain)
}

/// Aggregate already filtered rows, applying each field's declared policy.
pub fn aggregate_rows(rows: &[&AggregateRecord], domain: Perspective) -> DomainAggregate {
    let n = rows.len();

    let fields: BTreeMap<MetricField, f64> = MetricField::for_domain(domain)
        .map(|field| {
            let sum: f64 = rows.iter().map(|r| field.value_of(r)).sum();
            let value = match field.policy() {
                AggregationPolicy::Sum => sum,
                AggregationPolicy::Mean if n == 0 => 0.0,
                AggregationPolicy::Mean => sum / n as f64,
            };
            (field, value)
        })
        .collect();

    let derived = DerivedMetric::ALL
        .into_iter()
        .filter(|d| d.domain() == domain)
        .map(|d| {
            let (num, den) = d.operands();
            let num = fields.get(&num).copied().unwrap_or(0.0);
            let den = fields.get(&den).copied().unwrap_or(0.0);
            (d, compute_derived(d, num, den))
        })
        .collect();

    DomainAggregate {
        domain,
        record_count: n,
        fields,
        derived,
    }
}

/// Zero when the denominator is zero.
pub fn compute_derived(metric: DerivedMetric, numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    match metric {
        DerivedMetric::RevenueVsTarget => (numerator / denominator - 1.0) * 100.0,
        DerivedMetric::CostPerProject => numerator / denominator,
    }
}

/// Scalar shown on the KPI's card.
pub fn kpi_value(def: &KpiDefinition, agg: &DomainAggregate) -> f64 {
    match def.source {
        KpiSource::Field(field) => agg.field(field),
        KpiSource::Derived(metric) => agg.derived(metric),
    }
}

/// Percentage change relative to `prev`; `None` when `prev` is ~0.
pub fn pct_change(cur: f64, prev: f64) -> Option<f64> {
    if prev.abs() < 0.01 {
        None
    } else {
        Some(((cur - prev) / prev.abs()) * 100.0)
    }
}
