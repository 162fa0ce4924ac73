use contracts::shared::kpi::*;

use super::catalog::MetricCatalog;
use super::error::KpiResult;
use crate::shared::format::{format_decimal, format_thousands};

/// Render one KPI card from its scalar and change percentage.
pub fn render(
    catalog: &MetricCatalog,
    kpi_id: &KpiId,
    value: f64,
    change_pct: f64,
) -> KpiResult<CardView> {
    let def = catalog.lookup(kpi_id)?;
    // text, arrow and class all follow the one-decimal value shown
    let change_pct = if change_pct.is_finite() {
        (change_pct * 10.0).round() / 10.0
    } else {
        0.0
    };

    Ok(CardView {
        kpi_id: def.kpi_id.clone(),
        title: def.display_name.clone(),
        display_text: format_value(def.unit, value),
        change_text: format_change(change_pct),
        trend: trend_direction(change_pct),
        polarity_class: polarity_class(def.polarity, change_pct),
        has_data: true,
    })
}

pub fn polarity_class(polarity: Polarity, change_pct: f64) -> PolarityClass {
    match (polarity, change_pct) {
        (_, c) if c == 0.0 => PolarityClass::Neutral,
        (Polarity::HigherIsBetter, c) if c > 0.0 => PolarityClass::Improved,
        (Polarity::LowerIsBetter, c) if c < 0.0 => PolarityClass::Improved,
        _ => PolarityClass::Worsened,
    }
}

fn trend_direction(change_pct: f64) -> TrendDirection {
    if change_pct > 0.0 {
        TrendDirection::Up
    } else if change_pct < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    }
}

pub fn format_value(unit: ValueUnit, value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    match unit {
        ValueUnit::CurrencyThousands => {
            // saturating cast; format_thousands handles i64::MIN
            let thousands = (value / 1000.0).round() as i64;
            let digits = format_thousands(thousands);
            match digits.strip_prefix('-') {
                Some(abs) => format!("-${abs}K"),
                None => format!("${digits}K"),
            }
        }
        ValueUnit::Percentage => format!("{}%", format_decimal(value, 1)),
        ValueUnit::RatioOutOf { scale } => format!("{}/{}", format_decimal(value, 1), scale),
        ValueUnit::Hours => format!("{} h", format_decimal(value, 1)),
    }
}

pub fn format_change(change_pct: f64) -> String {
    if change_pct > 0.0 {
        format!("+{}%", format_decimal(change_pct, 1))
    } else if change_pct < 0.0 {
        format!("{}%", format_decimal(change_pct, 1))
    } else {
        "0%".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::kpi::metadata::ids;
    use crate::shared::kpi::KpiError;

    #[test]
    fn test_polarity_law() {
        let catalog = MetricCatalog::global();
        for def in catalog.all() {
            let up = render(catalog, &def.kpi_id, 1.0, 5.0).unwrap();
            let down = render(catalog, &def.kpi_id, 1.0, -5.0).unwrap();
            match def.polarity {
                Polarity::HigherIsBetter => {
                    assert_eq!(up.polarity_class, PolarityClass::Improved);
                    assert_eq!(down.polarity_class, PolarityClass::Worsened);
                }
                Polarity::LowerIsBetter => {
                    assert_eq!(up.polarity_class, PolarityClass::Worsened);
                    assert_eq!(down.polarity_class, PolarityClass::Improved);
                }
            }
            let flat = render(catalog, &def.kpi_id, 1.0, 0.0).unwrap();
            assert_eq!(flat.polarity_class, PolarityClass::Neutral);
        }
    }

    #[test]
    fn test_lower_is_better_card() {
        let card = render(MetricCatalog::global(), &ids::defect_rate(), 2.345, -12.0).unwrap();
        assert_eq!(card.title, "Defect Rate");
        assert_eq!(card.display_text, "2.3%");
        assert_eq!(card.change_text, "-12.0%");
        assert_eq!(card.trend, TrendDirection::Down);
        assert_eq!(card.polarity_class, PolarityClass::Improved);
    }

    #[test]
    fn test_unit_formats() {
        assert_eq!(format_value(ValueUnit::CurrencyThousands, 1_234_000.0), "$1,234K");
        assert_eq!(format_value(ValueUnit::CurrencyThousands, -56_400.0), "-$56K");
        assert_eq!(format_value(ValueUnit::Percentage, 11.111), "11.1%");
        assert_eq!(format_value(ValueUnit::RatioOutOf { scale: 5 }, 4.21), "4.2/5");
        assert_eq!(format_value(ValueUnit::Hours, 3.5), "3.5 h");
        assert_eq!(format_value(ValueUnit::Hours, f64::NAN), "—");
    }

    #[test]
    fn test_huge_currency_values_do_not_overflow() {
        let card = render(MetricCatalog::global(), &ids::revenue(), -1.0e25, 0.0).unwrap();
        assert_eq!(card.display_text, "-$9,223,372,036,854,775,808K");
        assert_eq!(
            format_value(ValueUnit::CurrencyThousands, 1.0e25),
            "$9,223,372,036,854,775,807K"
        );
    }

    #[test]
    fn test_change_below_display_precision_is_neutral() {
        let catalog = MetricCatalog::global();
        for change in [0.04, -0.04] {
            let card = render(catalog, &ids::revenue(), 1.0, change).unwrap();
            assert_eq!(card.change_text, "0%");
            assert_eq!(card.trend, TrendDirection::Flat);
            assert_eq!(card.polarity_class, PolarityClass::Neutral);
        }

        let card = render(catalog, &ids::defect_rate(), 1.0, -0.06).unwrap();
        assert_eq!(card.change_text, "-0.1%");
        assert_eq!(card.polarity_class, PolarityClass::Improved);
    }

    #[test]
    fn test_change_text() {
        assert_eq!(format_change(4.0), "+4.0%");
        assert_eq!(format_change(-1.54), "-1.5%");
        assert_eq!(format_change(0.0), "0%");
    }

    #[test]
    fn test_unknown_kpi() {
        let err = render(MetricCatalog::global(), &KpiId::new("nope"), 1.0, 0.0).unwrap_err();
        assert!(matches!(err, KpiError::UnknownKpi(_)));
    }

    #[test]
    fn test_non_finite_change_is_neutral() {
        let card = render(MetricCatalog::global(), &ids::csat(), 4.0, f64::NAN).unwrap();
        assert_eq!(card.polarity_class, PolarityClass::Neutral);
        assert_eq!(card.change_text, "0%");
    }
}
