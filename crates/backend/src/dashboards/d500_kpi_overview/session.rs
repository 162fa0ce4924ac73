use contracts::dashboards::d500_kpi_overview::{DashboardEvent, DashboardView};
use contracts::shared::kpi::FilterContext;
use std::sync::Arc;

use super::dataset::{Dataset, DatasetSource};
use super::service::{render_dashboard, AggregateCache};
use crate::shared::kpi::selection::SelectionState;
use crate::shared::kpi::{KpiError, KpiResult, MetricCatalog};

/// State of one open dashboard: filter, expansions and the dataset snapshot.
///
/// Every event is applied fully before the next render pass starts.
pub struct SessionController {
    catalog: &'static MetricCatalog,
    source: Box<dyn DatasetSource>,
    dataset: Arc<Dataset>,
    filter: FilterContext,
    selection: SelectionState,
    cache: AggregateCache,
}

impl SessionController {
    pub fn new(mut source: Box<dyn DatasetSource>) -> Self {
        let dataset = source.generate();
        Self {
            catalog: MetricCatalog::global(),
            source,
            dataset,
            filter: FilterContext::default(),
            selection: SelectionState::new(),
            cache: AggregateCache::new(),
        }
    }

    pub fn filter(&self) -> &FilterContext {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Apply one event. Rejected events leave the state untouched.
    pub fn apply(&mut self, event: DashboardEvent) -> KpiResult<()> {
        match event {
            DashboardEvent::SetMonth { month } => {
                self.filter.month = month;
            }
            DashboardEvent::SetBusinessUnit { business_unit } => {
                self.filter.business_unit = business_unit;
            }
            DashboardEvent::SelectKpi {
                perspective,
                kpi_id,
            } => {
                let def = self.catalog.lookup(&kpi_id)?;
                if def.domain != perspective {
                    return Err(KpiError::InvalidSelection(format!(
                        "{kpi_id} belongs to the {} group, not {perspective}",
                        def.domain
                    )));
                }
                self.selection.select(perspective, kpi_id);
            }
            DashboardEvent::ChooseSubdivision {
                perspective,
                subdivision,
            } => {
                self.selection
                    .choose_subdivision(perspective, &subdivision, self.catalog)?;
            }
            DashboardEvent::ClearAll => self.selection.clear_all(),
            DashboardEvent::Refresh => {
                self.source.invalidate();
                self.dataset = self.source.generate();
                self.cache.clear();
                tracing::info!(
                    "dataset regenerated: {} records",
                    self.dataset.records.len()
                );
            }
        }
        Ok(())
    }

    pub fn render(&mut self) -> DashboardView {
        render_dashboard(
            self.catalog,
            &self.dataset,
            &self.filter,
            &self.selection,
            &mut self.cache,
        )
    }

    /// `apply` followed by a render pass.
    pub fn handle(&mut self, event: DashboardEvent) -> KpiResult<DashboardView> {
        tracing::debug!("dashboard event: {event:?}");
        self.apply(event)?;
        Ok(self.render())
    }

    pub fn cached_aggregates(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d500_kpi_overview::dataset::{StaticDataset, SyntheticDataset};
    use crate::shared::kpi::metadata::ids;
    use contracts::shared::kpi::{
        AggregateRecord, BusinessUnit, ChartSpec, KpiId, Month, Perspective,
    };

    fn controller() -> SessionController {
        let mut r = AggregateRecord::new(BusinessUnit::Bu1, Month::January, "PRODEV");
        r.revenue = 1000.0;
        r.target = 900.0;
        r.gross_margin = 32.5;
        SessionController::new(Box::new(StaticDataset::new(vec![r])))
    }

    fn select(perspective: Perspective, kpi_id: KpiId) -> DashboardEvent {
        DashboardEvent::SelectKpi {
            perspective,
            kpi_id,
        }
    }

    #[test]
    fn test_initial_view() {
        let mut c = controller();
        let view = c.render();
        assert_eq!(view.title, "KPI Dashboard - BU1");
        assert_eq!(view.dataset.record_count, 1);
        assert!(view.groups.iter().all(|g| g.expanded.is_none()));
    }

    #[test]
    fn test_second_selection_replaces_first() {
        let mut c = controller();
        c.handle(select(Perspective::Financial, ids::revenue())).unwrap();
        let view = c
            .handle(select(Perspective::Financial, ids::gross_margin()))
            .unwrap();

        let financial = &view.groups[0];
        let expanded = financial.expanded.as_ref().unwrap();
        assert_eq!(expanded.kpi_id, ids::gross_margin());
        match &expanded.chart {
            ChartSpec::Trend { points, .. } => assert_eq!(points[0].value, 32.5),
            other => panic!("unexpected chart {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kpi_is_rejected() {
        let mut c = controller();
        let err = c
            .handle(select(Perspective::Financial, KpiId::new("nonexistent_kpi")))
            .unwrap_err();
        assert_eq!(err.to_string(), "metric not found: nonexistent_kpi");
        assert!(c.selection().is_collapsed(Perspective::Financial));
    }

    #[test]
    fn test_kpi_from_another_group_is_rejected() {
        let mut c = controller();
        let err = c
            .handle(select(Perspective::Customer, ids::revenue()))
            .unwrap_err();
        assert!(matches!(err, KpiError::InvalidSelection(_)));
        assert!(c.selection().is_collapsed(Perspective::Customer));
    }

    #[test]
    fn test_filter_change_keeps_selection() {
        let mut c = controller();
        c.handle(select(Perspective::Financial, ids::revenue())).unwrap();
        let view = c
            .handle(DashboardEvent::SetMonth {
                month: Month::March,
            })
            .unwrap();
        assert_eq!(c.filter().month, Month::March);
        assert_eq!(view.subtitle, "March");
        assert!(view.groups[0].expanded.is_some());
        // no March rows for BU1
        assert!(view.groups[0].cards.iter().all(|card| !card.has_data));
    }

    #[test]
    fn test_choose_subdivision_event() {
        let mut c = controller();
        c.handle(select(Perspective::Financial, ids::revenue())).unwrap();
        let view = c
            .handle(DashboardEvent::ChooseSubdivision {
                perspective: Perspective::Financial,
                subdivision: "ITS".to_string(),
            })
            .unwrap();
        assert_eq!(view.groups[0].expanded.as_ref().unwrap().subdivision, "ITS");

        let err = c
            .handle(DashboardEvent::ChooseSubdivision {
                perspective: Perspective::Employee,
                subdivision: "ITS".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, KpiError::InvalidSelection(_)));
    }

    #[test]
    fn test_clear_all_collapses_everything() {
        let mut c = controller();
        c.handle(select(Perspective::Financial, ids::revenue())).unwrap();
        c.handle(select(Perspective::Quality, ids::uptime())).unwrap();
        let view = c.handle(DashboardEvent::ClearAll).unwrap();
        assert!(view.groups.iter().all(|g| g.expanded.is_none()));
    }

    #[test]
    fn test_refresh_regenerates_dataset() {
        let mut c = SessionController::new(Box::new(SyntheticDataset::new(Some(3))));
        c.handle(select(Perspective::Employee, ids::engagement())).unwrap();
        let before = c.dataset().records.clone();
        assert!(c.cached_aggregates() > 0);

        c.apply(DashboardEvent::Refresh).unwrap();
        assert_eq!(c.cached_aggregates(), 0);
        assert_ne!(c.dataset().records, before);
        assert!(!c.selection().is_collapsed(Perspective::Employee));
    }
}
