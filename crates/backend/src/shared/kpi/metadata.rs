use contracts::shared::kpi::subdivisions::{DOCS, ITS, PRODEV};
use contracts::shared::kpi::*;

/// Well-known KPI IDs (constants to avoid typos).
pub mod ids {
    use super::*;

    pub fn revenue() -> KpiId {
        KpiId::new("revenue")
    }
    pub fn revenue_vs_target() -> KpiId {
        KpiId::new("revenue_vs_target")
    }
    pub fn gross_margin() -> KpiId {
        KpiId::new("gross_margin")
    }
    pub fn cost_per_project() -> KpiId {
        KpiId::new("cost_per_project")
    }
    pub fn csat() -> KpiId {
        KpiId::new("csat")
    }
    pub fn response_time() -> KpiId {
        KpiId::new("response_time")
    }
    pub fn first_contact_resolution() -> KpiId {
        KpiId::new("first_contact_resolution")
    }
    pub fn defect_rate() -> KpiId {
        KpiId::new("defect_rate")
    }
    pub fn uptime() -> KpiId {
        KpiId::new("uptime")
    }
    pub fn rework_rate() -> KpiId {
        KpiId::new("rework_rate")
    }
    pub fn engagement() -> KpiId {
        KpiId::new("engagement")
    }
    pub fn attrition_rate() -> KpiId {
        KpiId::new("attrition_rate")
    }
    pub fn training_hours() -> KpiId {
        KpiId::new("training_hours")
    }
}

fn subs(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

const LINE: ChartKind = ChartKind::Trend {
    style: TrendStyle::Line,
};
const BAR: ChartKind = ChartKind::Trend {
    style: TrendStyle::Bar,
};

/// Build the full catalogue of KPIs + perspective groups.
pub fn build_catalog() -> KpiCatalogResponse {
    let kpis = vec![
        // === Financial ===
        KpiDefinition {
            kpi_id: ids::revenue(),
            display_name: "Revenue".into(),
            domain: Perspective::Financial,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::CurrencyThousands,
            chart_kind: BAR,
            source: KpiSource::Field(MetricField::Revenue),
            description: Some("Total booked revenue for the month".into()),
        },
        KpiDefinition {
            kpi_id: ids::revenue_vs_target(),
            display_name: "Revenue vs Target".into(),
            domain: Perspective::Financial,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: ChartKind::Gauge,
            source: KpiSource::Derived(DerivedMetric::RevenueVsTarget),
            description: Some("Revenue above (+) or below (-) target, in percent".into()),
        },
        KpiDefinition {
            kpi_id: ids::gross_margin(),
            display_name: "Gross Margin".into(),
            domain: Perspective::Financial,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: LINE,
            source: KpiSource::Field(MetricField::GrossMargin),
            description: None,
        },
        KpiDefinition {
            kpi_id: ids::cost_per_project(),
            display_name: "Cost per Project".into(),
            domain: Perspective::Financial,
            applicable_subdivisions: subs(&[PRODEV, DOCS]),
            polarity: Polarity::LowerIsBetter,
            unit: ValueUnit::CurrencyThousands,
            chart_kind: BAR,
            source: KpiSource::Derived(DerivedMetric::CostPerProject),
            description: Some("Total cost / number of projects".into()),
        },
        // === Customer & Service ===
        KpiDefinition {
            kpi_id: ids::csat(),
            display_name: "CSAT".into(),
            domain: Perspective::Customer,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::RatioOutOf { scale: 5 },
            chart_kind: LINE,
            source: KpiSource::Field(MetricField::Csat),
            description: Some("Customer satisfaction score".into()),
        },
        KpiDefinition {
            kpi_id: ids::response_time(),
            display_name: "Avg Response Time".into(),
            domain: Perspective::Customer,
            applicable_subdivisions: subs(&[ITS, DOCS]),
            polarity: Polarity::LowerIsBetter,
            unit: ValueUnit::Hours,
            chart_kind: LINE,
            source: KpiSource::Field(MetricField::ResponseHours),
            description: None,
        },
        KpiDefinition {
            kpi_id: ids::first_contact_resolution(),
            display_name: "First Contact Resolution".into(),
            domain: Perspective::Customer,
            applicable_subdivisions: subs(&[ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: BAR,
            source: KpiSource::Field(MetricField::FirstContactResolution),
            description: None,
        },
        // === Quality ===
        KpiDefinition {
            kpi_id: ids::defect_rate(),
            display_name: "Defect Rate".into(),
            domain: Perspective::Quality,
            applicable_subdivisions: subs(&[PRODEV, DOCS]),
            polarity: Polarity::LowerIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: LINE,
            source: KpiSource::Field(MetricField::DefectRate),
            description: None,
        },
        KpiDefinition {
            kpi_id: ids::uptime(),
            display_name: "System Uptime".into(),
            domain: Perspective::Quality,
            applicable_subdivisions: subs(&[ITS, PRODEV]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: ChartKind::PartOfWhole,
            source: KpiSource::Field(MetricField::Uptime),
            description: Some("Share of the month the services were available".into()),
        },
        KpiDefinition {
            kpi_id: ids::rework_rate(),
            display_name: "Rework Rate".into(),
            domain: Perspective::Quality,
            applicable_subdivisions: subs(&[PRODEV, DOCS]),
            polarity: Polarity::LowerIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: BAR,
            source: KpiSource::Field(MetricField::ReworkRate),
            description: None,
        },
        // === Employee ===
        KpiDefinition {
            kpi_id: ids::engagement(),
            display_name: "Employee Engagement".into(),
            domain: Perspective::Employee,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::RatioOutOf { scale: 10 },
            chart_kind: LINE,
            source: KpiSource::Field(MetricField::Engagement),
            description: Some("Pulse survey score".into()),
        },
        KpiDefinition {
            kpi_id: ids::attrition_rate(),
            display_name: "Attrition Rate".into(),
            domain: Perspective::Employee,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::LowerIsBetter,
            unit: ValueUnit::Percentage,
            chart_kind: LINE,
            source: KpiSource::Field(MetricField::AttritionRate),
            description: None,
        },
        KpiDefinition {
            kpi_id: ids::training_hours(),
            display_name: "Training Hours".into(),
            domain: Perspective::Employee,
            applicable_subdivisions: subs(&[PRODEV, DOCS, ITS]),
            polarity: Polarity::HigherIsBetter,
            unit: ValueUnit::Hours,
            chart_kind: ChartKind::Default,
            source: KpiSource::Field(MetricField::TrainingHours),
            description: None,
        },
    ];

    let perspectives = Perspective::ALL
        .iter()
        .map(|p| {
            let ids: Vec<KpiId> = kpis
                .iter()
                .filter(|k| k.domain == *p)
                .map(|k| k.kpi_id.clone())
                .collect();
            PerspectiveMeta {
                perspective: *p,
                label: p.label().into(),
                columns: ids.len().clamp(1, 4) as u8,
                kpis: ids,
            }
        })
        .collect();

    KpiCatalogResponse { kpis, perspectives }
}
