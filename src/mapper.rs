use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::{
    BodyPartCase, HeatCell, InjuryTypeSlice, InjuryYearRecord, KpiTarget, Priority,
    TargetComparison, TargetUnit, VisitTier,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedPoint {
    pub year: i32,
    pub days_away: f64,
    pub restricted: f64,
    pub other: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: String,
    pub value: u32,
    pub color: String,
    pub percent: u32,
    pub percent_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesKey {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntensityBand {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl IntensityBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityBand::None => "NONE",
            IntensityBand::Low => "LOW",
            IntensityBand::Medium => "MEDIUM",
            IntensityBand::High => "HIGH",
            IntensityBand::Critical => "CRITICAL",
        }
    }

    pub fn color_token(&self) -> &'static str {
        match self {
            IntensityBand::None => "bg-gray-100",
            IntensityBand::Low => "bg-yellow-200",
            IntensityBand::Medium => "bg-orange-300",
            IntensityBand::High => "bg-orange-500",
            IntensityBand::Critical => "bg-red-600",
        }
    }

    /// Single-character glyph for text grids.
    pub fn glyph(&self) -> char {
        match self {
            IntensityBand::None => '.',
            IntensityBand::Low => '1',
            IntensityBand::Medium => '2',
            IntensityBand::High => '3',
            IntensityBand::Critical => '4',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeStyle {
    pub background: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatGridCell {
    pub month: u32,
    pub year: i32,
    pub incidents: u32,
    pub band: IntensityBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedBodyPart {
    pub rank: usize,
    pub name: String,
    pub cases: u32,
    pub share_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitTotals {
    pub total: u32,
    pub out_of_state: u32,
    pub local: u32,
    pub out_of_state_percent: u32,
}

static SERIES_LEGEND: [SeriesKey; 3] = [
    SeriesKey {
        key: "daysAway",
        label: "Days Away",
        color: "#dc2626",
    },
    SeriesKey {
        key: "restricted",
        label: "Restricted Work",
        color: "#ea580c",
    },
    SeriesKey {
        key: "other",
        label: "Other Recordable",
        color: "#f59e0b",
    },
];

/// Stacked-area input. Order and length are preserved; missing years stay missing.
pub fn to_stacked_series(records: &[InjuryYearRecord]) -> Vec<StackedPoint> {
    records
        .iter()
        .map(|record| StackedPoint {
            year: record.year,
            days_away: record.days_away,
            restricted: record.restricted,
            other: record.other,
        })
        .collect()
}

/// Stack order and colors for the series produced by [`to_stacked_series`].
pub fn series_legend() -> &'static [SeriesKey] {
    &SERIES_LEGEND
}

/// Pie wedges labelled with their share of this set's total.
pub fn to_pie_slices(slices: &[InjuryTypeSlice]) -> Result<Vec<PieSlice>> {
    if slices.is_empty() {
        return Ok(Vec::new());
    }

    let total: u64 = slices.iter().map(|slice| u64::from(slice.value)).sum();
    if total == 0 {
        return Err(DashboardError::precondition(
            "pie slice values sum to zero",
        ));
    }

    Ok(slices
        .iter()
        .map(|slice| {
            let percent = share_percent(u64::from(slice.value), total);
            PieSlice {
                name: slice.name.clone(),
                value: slice.value,
                color: slice.color.clone(),
                percent,
                percent_label: format!("{percent}%"),
            }
        })
        .collect())
}

fn share_percent(part: u64, total: u64) -> u32 {
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// Map `value / max` onto five bands. Upper bounds are inclusive, so a value
/// sitting exactly on a quarter boundary takes the lower band. Ratios above
/// one stay `Critical`.
pub fn classify_intensity(value: u32, max: u32) -> Result<IntensityBand> {
    if max == 0 {
        return Err(DashboardError::precondition(format!(
            "intensity max must be positive (value {value})"
        )));
    }

    // value/max <= k/4  <=>  4 * value <= k * max
    let scaled = u64::from(value) * 4;
    let max = u64::from(max);

    let band = if value == 0 {
        IntensityBand::None
    } else if scaled <= max {
        IntensityBand::Low
    } else if scaled <= 2 * max {
        IntensityBand::Medium
    } else if scaled <= 3 * max {
        IntensityBand::High
    } else {
        IntensityBand::Critical
    };

    Ok(band)
}

pub fn badge_style(priority: Priority) -> BadgeStyle {
    match priority {
        Priority::High => BadgeStyle {
            background: "bg-red-100",
            text: "text-red-800",
        },
        Priority::Medium => BadgeStyle {
            background: "bg-yellow-100",
            text: "text-yellow-800",
        },
    }
}

/// Badge lookup from a raw priority label.
pub fn badge_style_for(label: &str) -> Result<BadgeStyle> {
    let priority: Priority = label.parse()?;
    Ok(badge_style(priority))
}

/// Classify every cell against the largest count in the grid.
pub fn heat_grid(cells: &[HeatCell]) -> Result<Vec<HeatGridCell>> {
    let max = cells.iter().map(|cell| cell.incidents).max().unwrap_or(0);
    heat_grid_with_max(cells, max.max(1))
}

pub fn heat_grid_with_max(cells: &[HeatCell], max: u32) -> Result<Vec<HeatGridCell>> {
    if max == 0 {
        return Err(DashboardError::precondition(
            "heat grid max must be positive",
        ));
    }

    cells
        .iter()
        .map(|cell| {
            Ok(HeatGridCell {
                month: cell.month,
                year: cell.year,
                incidents: cell.incidents,
                band: classify_intensity(cell.incidents, max)?,
            })
        })
        .collect()
}

/// Descending by case count; ties keep their input order.
pub fn rank_body_parts(parts: &[BodyPartCase]) -> Vec<RankedBodyPart> {
    let total: u64 = parts.iter().map(|part| u64::from(part.cases)).sum();
    let mut sorted: Vec<&BodyPartCase> = parts.iter().collect();
    sorted.sort_by(|a, b| b.cases.cmp(&a.cases));

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, part)| {
            let share = if total == 0 {
                0
            } else {
                share_percent(u64::from(part.cases), total)
            };
            RankedBodyPart {
                rank: index + 1,
                name: part.name.clone(),
                cases: part.cases,
                share_label: format!("{share}%"),
            }
        })
        .collect()
}

pub fn kpi_display(kpi: &KpiTarget) -> String {
    let suffix = match kpi.unit {
        TargetUnit::Percent => "%",
        TargetUnit::Rate | TargetUnit::Ratio => "",
    };

    match (kpi.comparison, kpi.unit) {
        (TargetComparison::Above(threshold), TargetUnit::Ratio) => format!(">{threshold}:1"),
        (TargetComparison::Below(threshold), TargetUnit::Rate) => format!("<{threshold:.1}"),
        (TargetComparison::Below(threshold), _) => format!("<{threshold}{suffix}"),
        (TargetComparison::Above(threshold), _) => format!(">{threshold}{suffix}"),
        (TargetComparison::Exactly(threshold), _) => format!("{threshold}{suffix}"),
        (TargetComparison::AtMostDays(days), _) => format!("<{days} days"),
    }
}

pub fn visit_totals(plan: &[VisitTier]) -> VisitTotals {
    let mut total = 0u32;
    let mut out_of_state = 0u32;

    for tier in plan {
        let visits = (f64::from(tier.sites) * tier.visits_per_site_per_year).round() as u32;
        total += visits;
        if tier.out_of_state {
            out_of_state += visits;
        }
    }

    VisitTotals {
        total,
        out_of_state,
        local: total - out_of_state,
        out_of_state_percent: if total == 0 {
            0
        } else {
            share_percent(u64::from(out_of_state), u64::from(total))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn slice(name: &str, value: u32) -> InjuryTypeSlice {
        InjuryTypeSlice {
            name: name.to_string(),
            value,
            color: "#000000".to_string(),
        }
    }

    #[test]
    fn stacked_series_preserves_order_and_length() {
        let registry = Registry::builtin();
        let dataset = registry.category("423830").unwrap();
        let series = to_stacked_series(&dataset.injury_rates);

        assert_eq!(series.len(), 4);
        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023]);
        assert_eq!(series[2].restricted, 1.3);
    }

    #[test]
    fn stacked_series_does_not_fill_gaps() {
        let records = vec![
            InjuryYearRecord {
                year: 2023,
                days_away: 1.0,
                restricted: 1.0,
                other: 1.0,
            },
            InjuryYearRecord {
                year: 2020,
                days_away: 2.0,
                restricted: 2.0,
                other: 2.0,
            },
        ];
        let series = to_stacked_series(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].year, 2023);
        assert_eq!(series[1].year, 2020);
    }

    #[test]
    fn pie_labels_match_prenormalized_values() {
        let registry = Registry::builtin();
        let dataset = registry.category("423830").unwrap();
        let labels: Vec<String> = to_pie_slices(&dataset.injury_types)
            .unwrap()
            .into_iter()
            .map(|s| s.percent_label)
            .collect();
        assert_eq!(labels, vec!["35%", "22%", "14%", "11%", "10%", "8%"]);
    }

    #[test]
    fn pie_labels_use_local_sum() {
        let slices = vec![slice("a", 1), slice("b", 1), slice("c", 2)];
        let pie = to_pie_slices(&slices).unwrap();
        let percents: Vec<u32> = pie.iter().map(|s| s.percent).collect();
        assert_eq!(percents, vec![25, 25, 50]);
    }

    #[test]
    fn pie_percentages_sum_near_hundred() {
        let sets = vec![
            vec![slice("a", 1), slice("b", 1), slice("c", 1)],
            vec![slice("a", 7), slice("b", 13), slice("c", 29), slice("d", 2)],
            vec![slice("a", 5)],
        ];
        for set in sets {
            let sum: u32 = to_pie_slices(&set).unwrap().iter().map(|s| s.percent).sum();
            assert!((99..=101).contains(&sum), "sum was {sum}");
        }
    }

    #[test]
    fn equal_slices_round_individually() {
        // Per-slice rounding can overshoot 100 in total.
        let set: Vec<InjuryTypeSlice> = (0..6).map(|i| slice(&i.to_string(), 1)).collect();
        let pie = to_pie_slices(&set).unwrap();
        assert!(pie.iter().all(|s| s.percent_label == "17%"));
        assert_eq!(pie.iter().map(|s| s.percent).sum::<u32>(), 102);
    }

    #[test]
    fn pie_rejects_zero_total_and_allows_empty() {
        assert!(to_pie_slices(&[]).unwrap().is_empty());
        let err = to_pie_slices(&[slice("a", 0)]).unwrap_err();
        assert!(matches!(err, DashboardError::PreconditionViolation(_)));
    }

    #[test]
    fn intensity_boundaries_belong_to_lower_band() {
        assert_eq!(classify_intensity(0, 8).unwrap(), IntensityBand::None);
        assert_eq!(classify_intensity(2, 8).unwrap(), IntensityBand::Low);
        assert_eq!(classify_intensity(3, 8).unwrap(), IntensityBand::Medium);
        assert_eq!(classify_intensity(4, 8).unwrap(), IntensityBand::Medium);
        assert_eq!(classify_intensity(6, 8).unwrap(), IntensityBand::High);
        assert_eq!(classify_intensity(7, 8).unwrap(), IntensityBand::Critical);
        assert_eq!(classify_intensity(12, 8).unwrap(), IntensityBand::Critical);
    }

    #[test]
    fn intensity_extremes_for_any_max() {
        for max in 1..=50 {
            assert_eq!(classify_intensity(0, max).unwrap(), IntensityBand::None);
            assert_eq!(classify_intensity(max, max).unwrap(), IntensityBand::Critical);
        }
    }

    #[test]
    fn intensity_is_monotonic() {
        for max in 1..=20 {
            let mut previous = IntensityBand::None;
            for value in 0..=max * 2 {
                let band = classify_intensity(value, max).unwrap();
                assert!(band >= previous, "value {value} max {max}");
                previous = band;
            }
        }
    }

    #[test]
    fn intensity_rejects_zero_max() {
        let err = classify_intensity(3, 0).unwrap_err();
        assert!(matches!(err, DashboardError::PreconditionViolation(_)));
    }

    #[test]
    fn badge_styles_are_distinct() {
        let high = badge_style(Priority::High);
        let medium = badge_style(Priority::Medium);
        assert_ne!(high, medium);
        assert_eq!(high.background, "bg-red-100");
        assert_eq!(medium.text, "text-yellow-800");
        assert_eq!(badge_style_for("High").unwrap(), high);
    }

    #[test]
    fn badge_style_rejects_unknown_priority() {
        let err = badge_style_for("Low").unwrap_err();
        assert!(matches!(err, DashboardError::PreconditionViolation(_)));
    }

    #[test]
    fn heat_grid_uses_grid_max() {
        let cells = vec![
            HeatCell {
                month: 1,
                year: 2023,
                incidents: 8,
                day: 4,
            },
            HeatCell {
                month: 2,
                year: 2023,
                incidents: 3,
                day: 9,
            },
        ];
        let grid = heat_grid(&cells).unwrap();
        assert_eq!(grid[0].band, IntensityBand::Critical);
        assert_eq!(grid[1].band, IntensityBand::Medium);
    }

    #[test]
    fn heat_grid_rejects_zero_max_even_when_empty() {
        let err = heat_grid_with_max(&[], 0).unwrap_err();
        assert!(matches!(err, DashboardError::PreconditionViolation(_)));
    }

    #[test]
    fn heat_grid_max_override_rebands_cells() {
        let cells = [HeatCell {
            month: 5,
            year: 2024,
            incidents: 2,
            day: 10,
        }];
        let grid = heat_grid_with_max(&cells, 8).unwrap();
        assert_eq!(grid[0].band, IntensityBand::Low);
    }

    #[test]
    fn heat_grid_all_zero_is_none() {
        let cells = vec![
            HeatCell {
                month: 1,
                year: 2024,
                incidents: 0,
                day: 1,
            };
            3
        ];
        let grid = heat_grid(&cells).unwrap();
        assert!(grid.iter().all(|c| c.band == IntensityBand::None));
        assert!(heat_grid(&[]).unwrap().is_empty());
    }

    #[test]
    fn body_parts_ranked_descending() {
        let parts = vec![
            BodyPartCase {
                name: "Knee".to_string(),
                cases: 12,
            },
            BodyPartCase {
                name: "Back".to_string(),
                cases: 28,
            },
        ];
        let ranked = rank_body_parts(&parts);
        assert_eq!(ranked[0].name, "Back");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[0].share_label, "70%");
    }

    #[test]
    fn kpi_targets_format_like_dashboard() {
        let registry = Registry::builtin();
        let labels: Vec<String> = registry.kpis().iter().map(kpi_display).collect();
        assert_eq!(
            labels,
            vec!["<2.0", "<1.0", ">5:1", "100%", ">95%", "100%", ">90%", "<30 days"]
        );
    }

    #[test]
    fn builtin_visit_plan_totals() {
        let registry = Registry::builtin();
        let totals = visit_totals(registry.visit_plan());
        assert_eq!(
            totals,
            VisitTotals {
                total: 48,
                out_of_state: 36,
                local: 12,
                out_of_state_percent: 75,
            }
        );
    }
}
