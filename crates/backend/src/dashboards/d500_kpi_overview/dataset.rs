use chrono::{DateTime, Utc};
use contracts::dashboards::d500_kpi_overview::DatasetInfo;
use contracts::shared::kpi::{subdivisions, AggregateRecord, BusinessUnit, Month};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Immutable snapshot of all rows used by a render pass.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<AggregateRecord>,
    pub generated_at: DateTime<Utc>,
}

impl Dataset {
    pub fn from_records(records: Vec<AggregateRecord>) -> Self {
        Self {
            records,
            generated_at: Utc::now(),
        }
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            generated_at: self.generated_at,
            record_count: self.records.len(),
        }
    }
}

/// Supplier of the dashboard's rows.
///
/// `generate` may hand out a cached snapshot; after `invalidate` the next
/// call must produce a fresh one.
pub trait DatasetSource: Send {
    fn generate(&mut self) -> Arc<Dataset>;
    fn invalidate(&mut self);
}

// ---------------------------------------------------------------------------
// Synthetic source
// ---------------------------------------------------------------------------

/// Random rows in plausible ranges, one per BU x month x subdivision.
pub struct SyntheticDataset {
    rng: StdRng,
    current: Option<Arc<Dataset>>,
}

impl SyntheticDataset {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, current: None }
    }

    fn sample(&mut self, business_unit: BusinessUnit, month: Month, subdivision: &str) -> AggregateRecord {
        let rng = &mut self.rng;
        let mut r = AggregateRecord::new(business_unit, month, subdivision);

        r.revenue = round_to(rng.gen_range(80_000.0..150_000.0), 0);
        r.target = round_to(rng.gen_range(90_000.0..130_000.0), 0);
        r.cost = round_to(rng.gen_range(40_000.0..90_000.0), 0);
        r.projects = rng.gen_range(3..=12) as f64;
        r.gross_margin = round_to(rng.gen_range(25.0..45.0), 1);

        r.csat = round_to(rng.gen_range(3.5..4.9), 2);
        r.response_hours = round_to(rng.gen_range(1.0..8.0), 1);
        r.first_contact_resolution = round_to(rng.gen_range(60.0..90.0), 1);

        r.defect_rate = round_to(rng.gen_range(0.5..5.0), 2);
        r.uptime = round_to(rng.gen_range(97.0..99.99), 2);
        r.rework_rate = round_to(rng.gen_range(2.0..12.0), 1);

        r.engagement = round_to(rng.gen_range(6.0..9.5), 1);
        r.attrition_rate = round_to(rng.gen_range(0.5..4.0), 2);
        r.training_hours = round_to(rng.gen_range(10.0..60.0), 0);
        r
    }

    fn build(&mut self) -> Dataset {
        let mut records =
            Vec::with_capacity(BusinessUnit::ALL.len() * Month::ALL.len() * subdivisions::ALL.len());
        for bu in BusinessUnit::ALL {
            for month in Month::ALL {
                for sub in subdivisions::ALL {
                    records.push(self.sample(bu, month, sub));
                }
            }
        }
        Dataset::from_records(records)
    }
}

impl DatasetSource for SyntheticDataset {
    fn generate(&mut self) -> Arc<Dataset> {
        if let Some(current) = &self.current {
            return Arc::clone(current);
        }
        let dataset = Arc::new(self.build());
        tracing::debug!("generated synthetic dataset with {} records", dataset.records.len());
        self.current = Some(Arc::clone(&dataset));
        dataset
    }

    fn invalidate(&mut self) {
        self.current = None;
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Fixed source
// ---------------------------------------------------------------------------

/// Serves the same rows on every call.
pub struct StaticDataset {
    dataset: Arc<Dataset>,
}

impl StaticDataset {
    pub fn new(records: Vec<AggregateRecord>) -> Self {
        Self {
            dataset: Arc::new(Dataset::from_records(records)),
        }
    }
}

impl DatasetSource for StaticDataset {
    fn generate(&mut self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    fn invalidate(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_record_per_cell() {
        let mut source = SyntheticDataset::new(Some(7));
        let ds = source.generate();
        assert_eq!(ds.records.len(), 3 * 6 * 3);
        assert_eq!(ds.info().record_count, 54);
        assert!(ds.records.iter().all(|r| r.uptime >= 97.0 && r.uptime <= 99.99));
        assert!(ds.records.iter().all(|r| r.projects >= 3.0));
    }

    #[test]
    fn test_generate_is_cached_until_invalidated() {
        let mut source = SyntheticDataset::new(Some(7));
        let a = source.generate();
        let b = source.generate();
        assert!(Arc::ptr_eq(&a, &b));

        source.invalidate();
        let c = source.generate();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_ne!(a.records, c.records);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = SyntheticDataset::new(Some(42)).generate();
        let b = SyntheticDataset::new(Some(42)).generate();
        assert_eq!(a.records, b.records);
    }
}
