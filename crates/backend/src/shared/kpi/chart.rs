use contracts::shared::kpi::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::aggregate::{aggregate_rows, kpi_value};
use super::catalog::MetricCatalog;
use super::error::{KpiError, KpiResult};

/// Everything a chart builder needs; the definition is already resolved.
pub struct ChartInput<'a> {
    pub def: &'a KpiDefinition,
    pub subdivision: &'a str,
    pub records: &'a [AggregateRecord],
    pub ctx: &'a FilterContext,
}

type ChartBuilder = fn(&ChartInput<'_>) -> KpiResult<ChartSpec>;

static CHARTS: Lazy<ChartRegistry> = Lazy::new(ChartRegistry::new);

/// Fixed table: declared chart kind -> builder.
pub struct ChartRegistry {
    builders: HashMap<ChartKind, ChartBuilder>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        let mut builders: HashMap<ChartKind, ChartBuilder> = HashMap::new();

        builders.insert(
            ChartKind::Trend {
                style: TrendStyle::Line,
            },
            build_trend,
        );
        builders.insert(
            ChartKind::Trend {
                style: TrendStyle::Bar,
            },
            build_trend,
        );
        builders.insert(ChartKind::Gauge, build_gauge);
        builders.insert(ChartKind::PartOfWhole, build_part_of_whole);
        builders.insert(ChartKind::Default, build_table);

        Self { builders }
    }

    pub fn supports(&self, kind: ChartKind) -> bool {
        self.builders.contains_key(&kind)
    }

    /// Never fails: missing data and numeric trouble become `EmptySeries`.
    pub fn build(&self, input: &ChartInput<'_>) -> ChartSpec {
        let def = input.def;
        let Some(builder) = self.builders.get(&def.chart_kind) else {
            tracing::warn!("no chart builder for {:?} ({})", def.chart_kind, def.kpi_id);
            return empty(def, "chart type is not supported");
        };

        match builder(input) {
            Ok(spec) if is_finite(&spec) => spec,
            Ok(_) => {
                tracing::warn!("chart for {} produced non-finite values", def.kpi_id);
                empty(def, "values could not be computed")
            }
            Err(KpiError::NoData(reason)) => empty(def, &reason),
            Err(e) => {
                tracing::warn!("chart for {} failed: {e}", def.kpi_id);
                empty(def, &e.to_string())
            }
        }
    }
}

impl Default for ChartRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the detail chart for `kpi_id` in `subdivision` under `ctx`.
///
/// Fails only with `UnknownKpi`; every known KPI yields a `ChartSpec`.
pub fn build_chart(
    catalog: &MetricCatalog,
    kpi_id: &KpiId,
    subdivision: &str,
    records: &[AggregateRecord],
    ctx: &FilterContext,
) -> KpiResult<ChartSpec> {
    let def = catalog.lookup(kpi_id)?;
    let input = ChartInput {
        def,
        subdivision,
        records,
        ctx,
    };
    Ok(CHARTS.build(&input))
}

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

fn rows_for<'a>(input: &ChartInput<'a>, month: Month) -> Vec<&'a AggregateRecord> {
    input
        .records
        .iter()
        .filter(|r| {
            r.business_unit == input.ctx.business_unit
                && r.subdivision == input.subdivision
                && r.month == month
        })
        .collect()
}

/// One point per month that has rows, in month order.
fn monthly_series(input: &ChartInput<'_>) -> Vec<SeriesPoint> {
    Month::ALL
        .iter()
        .filter_map(|&month| {
            let rows = rows_for(input, month);
            if rows.is_empty() {
                return None;
            }
            let agg = aggregate_rows(&rows, input.def.domain);
            Some(SeriesPoint {
                label: month.as_str().to_string(),
                value: kpi_value(input.def, &agg),
            })
        })
        .collect()
}

fn no_data(input: &ChartInput<'_>, scope: &str) -> KpiError {
    KpiError::NoData(format!(
        "no {} data for {} / {}{}",
        input.def.display_name, input.ctx.business_unit, input.subdivision, scope
    ))
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn build_trend(input: &ChartInput<'_>) -> KpiResult<ChartSpec> {
    let style = match input.def.chart_kind {
        ChartKind::Trend { style } => style,
        _ => TrendStyle::Line,
    };
    let points = monthly_series(input);
    if points.is_empty() {
        return Err(no_data(input, ""));
    }

    Ok(ChartSpec::Trend {
        kpi_id: input.def.kpi_id.clone(),
        title: format!(
            "{} trend - {} / {}",
            input.def.display_name, input.ctx.business_unit, input.subdivision
        ),
        style,
        unit: input.def.unit,
        points,
    })
}

fn build_gauge(input: &ChartInput<'_>) -> KpiResult<ChartSpec> {
    let month = input.ctx.month;
    let (actual_field, target_field) = match input.def.source {
        KpiSource::Derived(metric) => metric.operands(),
        KpiSource::Field(_) => {
            return Err(KpiError::NoData(format!(
                "{} has no target to compare against",
                input.def.display_name
            )))
        }
    };

    let rows = rows_for(input, month);
    if rows.is_empty() {
        return Err(no_data(input, &format!(" in {month}")));
    }

    let agg = aggregate_rows(&rows, input.def.domain);
    let actual = agg.field(actual_field);
    let target = agg.field(target_field);
    if target.abs() < f64::EPSILON {
        return Err(KpiError::NoData(format!(
            "{} target is zero for {} / {} in {month}",
            input.def.display_name, input.ctx.business_unit, input.subdivision
        )));
    }

    Ok(ChartSpec::Gauge {
        kpi_id: input.def.kpi_id.clone(),
        title: format!(
            "{} - {} / {}, {month}",
            input.def.display_name, input.ctx.business_unit, input.subdivision
        ),
        month,
        actual,
        target,
        achievement_pct: actual / target * 100.0,
    })
}

fn build_part_of_whole(input: &ChartInput<'_>) -> KpiResult<ChartSpec> {
    let month = input.ctx.month;
    let rows = rows_for(input, month);
    if rows.is_empty() {
        return Err(no_data(input, &format!(" in {month}")));
    }

    let agg = aggregate_rows(&rows, input.def.domain);
    let share = kpi_value(input.def, &agg).clamp(0.0, 100.0);
    let (part, rest) = match input.def.source {
        KpiSource::Field(MetricField::Uptime) => ("Uptime", "Downtime"),
        _ => (input.def.display_name.as_str(), "Other"),
    };

    Ok(ChartSpec::PartOfWhole {
        kpi_id: input.def.kpi_id.clone(),
        title: format!(
            "{} - {} / {}, {month}",
            input.def.display_name, input.ctx.business_unit, input.subdivision
        ),
        month,
        slices: vec![
            Slice {
                label: part.to_string(),
                value: share,
            },
            Slice {
                label: rest.to_string(),
                value: 100.0 - share,
            },
        ],
    })
}

fn build_table(input: &ChartInput<'_>) -> KpiResult<ChartSpec> {
    let rows = monthly_series(input);
    if rows.is_empty() {
        return Err(no_data(input, ""));
    }

    Ok(ChartSpec::Table {
        kpi_id: input.def.kpi_id.clone(),
        title: format!(
            "{} by month - {} / {}",
            input.def.display_name, input.ctx.business_unit, input.subdivision
        ),
        unit: input.def.unit,
        rows,
    })
}

fn empty(def: &KpiDefinition, reason: &str) -> ChartSpec {
    ChartSpec::EmptySeries {
        kpi_id: def.kpi_id.clone(),
        title: def.display_name.clone(),
        reason: reason.to_string(),
    }
}

fn is_finite(spec: &ChartSpec) -> bool {
    match spec {
        ChartSpec::Trend { points, .. } => points.iter().all(|p| p.value.is_finite()),
        ChartSpec::Table { rows, .. } => rows.iter().all(|p| p.value.is_finite()),
        ChartSpec::Gauge {
            actual,
            target,
            achievement_pct,
            ..
        } => actual.is_finite() && target.is_finite() && achievement_pct.is_finite(),
        ChartSpec::PartOfWhole { slices, .. } => slices.iter().all(|s| s.value.is_finite()),
        ChartSpec::EmptySeries { .. } => true,
    }
}
