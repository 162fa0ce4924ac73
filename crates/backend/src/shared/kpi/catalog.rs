use contracts::shared::kpi::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::error::{KpiError, KpiResult};
use super::metadata;

/// Process-wide catalogue, built once from [`metadata::build_catalog`].
pub static CATALOG: Lazy<MetricCatalog> =
    Lazy::new(|| MetricCatalog::from_response(metadata::build_catalog()));

/// Static registry `kpi_id -> KpiDefinition`.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    kpis: Vec<KpiDefinition>,
    perspectives: Vec<PerspectiveMeta>,
    index: HashMap<KpiId, usize>,
}

impl MetricCatalog {
    pub fn from_response(response: KpiCatalogResponse) -> Self {
        let index = response
            .kpis
            .iter()
            .enumerate()
            .map(|(i, k)| (k.kpi_id.clone(), i))
            .collect();
        Self {
            kpis: response.kpis,
            perspectives: response.perspectives,
            index,
        }
    }

    pub fn global() -> &'static MetricCatalog {
        &CATALOG
    }

    pub fn lookup(&self, kpi_id: &KpiId) -> KpiResult<&KpiDefinition> {
        self.index
            .get(kpi_id)
            .map(|&i| &self.kpis[i])
            .ok_or_else(|| KpiError::UnknownKpi(kpi_id.clone()))
    }

    pub fn subdivisions_for(&self, kpi_id: &KpiId) -> KpiResult<&[String]> {
        self.lookup(kpi_id)
            .map(|def| def.applicable_subdivisions.as_slice())
    }

    pub fn all(&self) -> &[KpiDefinition] {
        &self.kpis
    }

    /// Definitions of one perspective group, in card order.
    pub fn for_perspective(&self, perspective: Perspective) -> Vec<&KpiDefinition> {
        match self.perspective_meta(perspective) {
            Some(meta) => meta
                .kpis
                .iter()
                .filter_map(|id| self.lookup(id).ok())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn perspective_meta(&self, perspective: Perspective) -> Option<&PerspectiveMeta> {
        self.perspectives
            .iter()
            .find(|m| m.perspective == perspective)
    }

    pub fn to_response(&self) -> KpiCatalogResponse {
        KpiCatalogResponse {
            kpis: self.kpis.clone(),
            perspectives: self.perspectives.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::kpi::metadata::ids;
    use std::collections::HashSet;

    #[test]
    fn test_every_kpi_tracks_some_subdivision() {
        let catalog = MetricCatalog::global();
        for def in catalog.all() {
            let subs = catalog.subdivisions_for(&def.kpi_id).unwrap();
            assert!(!subs.is_empty(), "{} has no subdivisions", def.kpi_id);
            for s in subs {
                assert!(subdivisions::ALL.contains(&s.as_str()), "unknown code {s}");
            }
        }
    }

    #[test]
    fn test_lookup_unknown_kpi() {
        let err = MetricCatalog::global()
            .lookup(&KpiId::new("nonexistent_kpi"))
            .unwrap_err();
        assert_eq!(err, KpiError::UnknownKpi(KpiId::new("nonexistent_kpi")));
        assert_eq!(err.to_string(), "metric not found: nonexistent_kpi");
    }

    #[test]
    fn test_ids_are_unique() {
        let all = MetricCatalog::global().all();
        let unique: HashSet<_> = all.iter().map(|k| &k.kpi_id).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_source_matches_domain() {
        for def in MetricCatalog::global().all() {
            let source_domain = match def.source {
                KpiSource::Field(f) => f.domain(),
                KpiSource::Derived(d) => d.domain(),
            };
            assert_eq!(source_domain, def.domain, "{}", def.kpi_id);
        }
    }

    #[test]
    fn test_perspective_groups_cover_catalog() {
        let catalog = MetricCatalog::global();
        let mut seen = 0;
        for p in Perspective::ALL {
            let defs = catalog.for_perspective(p);
            assert!(!defs.is_empty(), "{p} is empty");
            assert!(defs.iter().all(|d| d.domain == p));
            seen += defs.len();
        }
        assert_eq!(seen, catalog.all().len());

        let financial = catalog.for_perspective(Perspective::Financial);
        assert_eq!(financial[0].kpi_id, ids::revenue());
    }

    #[test]
    fn test_point_in_time_kpis() {
        let catalog = MetricCatalog::global();
        assert_eq!(
            catalog.lookup(&ids::revenue_vs_target()).unwrap().chart_kind,
            ChartKind::Gauge
        );
        assert_eq!(
            catalog.lookup(&ids::uptime()).unwrap().chart_kind,
            ChartKind::PartOfWhole
        );
    }
}
