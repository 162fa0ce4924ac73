use contracts::dashboards::d500_kpi_overview::{DashboardView, ExpandedView, GroupView};
use contracts::shared::kpi::{FilterContext, KpiDefinition, Perspective};
use std::collections::HashMap;

use super::dataset::Dataset;
use crate::shared::kpi::aggregate::{self, kpi_value, pct_change, DomainAggregate};
use crate::shared::kpi::selection::{Expansion, SelectionState};
use crate::shared::kpi::{card, chart, KpiError, MetricCatalog};

/// Aggregates already computed for the current dataset.
pub type AggregateCache = HashMap<(Perspective, FilterContext), DomainAggregate>;

/// One full render pass over every perspective group.
///
/// A failure inside one group is reported on that group only.
pub fn render_dashboard(
    catalog: &MetricCatalog,
    dataset: &Dataset,
    filter: &FilterContext,
    selection: &SelectionState,
    cache: &mut AggregateCache,
) -> DashboardView {
    let groups = Perspective::ALL
        .iter()
        .map(|&p| render_group(catalog, dataset, filter, selection, cache, p))
        .collect();

    DashboardView {
        title: format!("KPI Dashboard - {}", filter.business_unit),
        subtitle: filter.month.to_string(),
        filter: *filter,
        dataset: dataset.info(),
        groups,
    }
}

fn cached_aggregate<'c>(
    cache: &'c mut AggregateCache,
    dataset: &Dataset,
    perspective: Perspective,
    filter: FilterContext,
) -> &'c DomainAggregate {
    cache
        .entry((perspective, filter))
        .or_insert_with(|| aggregate::aggregate(&dataset.records, perspective, &filter))
}

fn render_group(
    catalog: &MetricCatalog,
    dataset: &Dataset,
    filter: &FilterContext,
    selection: &SelectionState,
    cache: &mut AggregateCache,
    perspective: Perspective,
) -> GroupView {
    let current = cached_aggregate(cache, dataset, perspective, *filter).clone();
    let previous = filter.month.previous().map(|month| {
        let ctx = FilterContext { month, ..*filter };
        cached_aggregate(cache, dataset, perspective, ctx).clone()
    });

    let mut errors: Vec<String> = Vec::new();

    let cards = catalog
        .for_perspective(perspective)
        .into_iter()
        .filter_map(|def| {
            let value = kpi_value(def, &current);
            let change = change_vs_previous(def, &current, previous.as_ref());
            match card::render(catalog, &def.kpi_id, value, change) {
                Ok(mut view) => {
                    view.has_data = current.has_data();
                    Some(view)
                }
                Err(e) => {
                    tracing::warn!("card {} failed: {e}", def.kpi_id);
                    errors.push(e.to_string());
                    None
                }
            }
        })
        .collect();

    let expanded = match selection.expanded(perspective) {
        Some(expansion) => match render_expanded(catalog, dataset, filter, expansion) {
            Ok(view) => Some(view),
            Err(e) => {
                tracing::warn!("{perspective} detail chart failed: {e}");
                errors.push(e.to_string());
                None
            }
        },
        None => None,
    };

    let (label, columns) = match catalog.perspective_meta(perspective) {
        Some(meta) => (meta.label.clone(), meta.columns),
        None => (perspective.label().to_string(), 3),
    };

    GroupView {
        perspective,
        label,
        columns,
        cards,
        expanded,
        error: if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        },
    }
}

/// Month-over-month change of the card value; 0 when there is nothing to compare.
fn change_vs_previous(
    def: &KpiDefinition,
    current: &DomainAggregate,
    previous: Option<&DomainAggregate>,
) -> f64 {
    match previous {
        Some(prev) if prev.has_data() && current.has_data() => {
            pct_change(kpi_value(def, current), kpi_value(def, prev)).unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

fn render_expanded(
    catalog: &MetricCatalog,
    dataset: &Dataset,
    filter: &FilterContext,
    expansion: &Expansion,
) -> Result<ExpandedView, KpiError> {
    let def = catalog.lookup(&expansion.kpi_id)?;
    let subdivision = expansion
        .active_subdivision(def)
        .ok_or_else(|| {
            KpiError::InvalidSelection(format!("{} tracks no subdivisions", def.kpi_id))
        })?
        .to_string();

    let chart = chart::build_chart(catalog, &def.kpi_id, &subdivision, &dataset.records, filter)?;

    Ok(ExpandedView {
        kpi_id: def.kpi_id.clone(),
        subdivision,
        subdivisions: def.applicable_subdivisions.clone(),
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::kpi::metadata::ids;
    use contracts::shared::kpi::{
        AggregateRecord, BusinessUnit, ChartSpec, KpiId, Month, PolarityClass,
    };

    fn records() -> Vec<AggregateRecord> {
        let mut jan = AggregateRecord::new(BusinessUnit::Bu1, Month::January, "PRODEV");
        jan.revenue = 1000.0;
        jan.target = 900.0;
        jan.defect_rate = 4.0;
        let mut feb = AggregateRecord::new(BusinessUnit::Bu1, Month::February, "PRODEV");
        feb.revenue = 1100.0;
        feb.target = 1000.0;
        feb.defect_rate = 2.0;
        vec![jan, feb]
    }

    fn render(filter: FilterContext, selection: &SelectionState) -> DashboardView {
        let dataset = Dataset::from_records(records());
        let mut cache = AggregateCache::new();
        render_dashboard(MetricCatalog::global(), &dataset, &filter, selection, &mut cache)
    }

    fn group(view: &DashboardView, p: Perspective) -> &GroupView {
        view.groups.iter().find(|g| g.perspective == p).unwrap()
    }

    #[test]
    fn test_renders_all_groups_collapsed() {
        let view = render(FilterContext::default(), &SelectionState::new());
        assert_eq!(view.title, "KPI Dashboard - BU1");
        assert_eq!(view.subtitle, "January");
        assert_eq!(view.groups.len(), 4);
        assert!(view.groups.iter().all(|g| g.expanded.is_none() && g.error.is_none()));

        let financial = group(&view, Perspective::Financial);
        assert_eq!(financial.label, "Financial");
        assert_eq!(financial.cards.len(), 4);
        assert_eq!(financial.cards[0].display_text, "$1K");
        assert_eq!(financial.cards[1].display_text, "11.1%");
        // January has no previous month
        assert!(financial.cards.iter().all(|c| c.change_text == "0%"));
    }

    #[test]
    fn test_change_vs_previous_month() {
        let filter = FilterContext::new(BusinessUnit::Bu1, Month::February);
        let view = render(filter, &SelectionState::new());

        let revenue = &group(&view, Perspective::Financial).cards[0];
        assert_eq!(revenue.change_text, "+10.0%");
        assert_eq!(revenue.polarity_class, PolarityClass::Improved);

        let defect = group(&view, Perspective::Quality)
            .cards
            .iter()
            .find(|c| c.kpi_id == ids::defect_rate())
            .unwrap();
        assert_eq!(defect.change_text, "-50.0%");
        assert_eq!(defect.polarity_class, PolarityClass::Improved);
    }

    #[test]
    fn test_empty_filter_gives_zero_cards() {
        let filter = FilterContext::new(BusinessUnit::Bu3, Month::May);
        let view = render(filter, &SelectionState::new());
        for g in &view.groups {
            assert!(g.cards.iter().all(|c| !c.has_data));
            assert!(g.cards.iter().all(|c| c.polarity_class == PolarityClass::Neutral));
        }
    }

    #[test]
    fn test_expanded_group_gets_chart() {
        let mut selection = SelectionState::new();
        selection.select(Perspective::Financial, ids::revenue());
        selection.select(Perspective::Quality, ids::uptime());

        let view = render(FilterContext::default(), &selection);

        let financial = group(&view, Perspective::Financial);
        let expanded = financial.expanded.as_ref().unwrap();
        assert_eq!(expanded.subdivision, "PRODEV");
        assert!(matches!(expanded.chart, ChartSpec::Trend { .. }));

        // uptime defaults to ITS, which has no rows
        let quality = group(&view, Perspective::Quality);
        let expanded = quality.expanded.as_ref().unwrap();
        assert_eq!(expanded.subdivision, "ITS");
        assert!(expanded.chart.is_empty());
        assert!(quality.error.is_none());
    }

    #[test]
    fn test_failing_group_does_not_block_others() {
        let mut selection = SelectionState::new();
        selection.select(Perspective::Customer, KpiId::new("ghost_metric"));
        selection.select(Perspective::Financial, ids::revenue());

        let view = render(FilterContext::default(), &selection);

        let customer = group(&view, Perspective::Customer);
        assert!(customer.expanded.is_none());
        assert_eq!(
            customer.error.as_deref(),
            Some("metric not found: ghost_metric")
        );
        assert!(!customer.cards.is_empty());
        assert!(group(&view, Perspective::Financial).expanded.is_some());
    }

    #[test]
    fn test_aggregates_are_cached() {
        let dataset = Dataset::from_records(records());
        let mut cache = AggregateCache::new();
        let filter = FilterContext::new(BusinessUnit::Bu1, Month::February);
        render_dashboard(
            MetricCatalog::global(),
            &dataset,
            &filter,
            &SelectionState::new(),
            &mut cache,
        );
        // current + previous month for each perspective
        assert_eq!(cache.len(), 8);
    }
}
