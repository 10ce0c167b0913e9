use std::fmt::Write;

use chrono::NaiveDate;

use crate::error::Result;
use crate::mapper::{self, HeatGridCell, IntensityBand};
use crate::models::CategoryDataset;
use crate::registry::Registry;

pub struct HeatSection<'a> {
    pub label: &'a str,
    pub cells: &'a [HeatGridCell],
}

pub fn build_report(
    registry: &Registry,
    dataset: &CategoryDataset,
    heat: Option<HeatSection<'_>>,
    generated_on: NaiveDate,
) -> Result<String> {
    let series = mapper::to_stacked_series(&dataset.injury_rates);
    let slices = mapper::to_pie_slices(&dataset.injury_types)?;
    let body_parts = mapper::rank_body_parts(registry.body_parts());

    let mut output = String::new();

    let _ = writeln!(
        output,
        "# {} Incident Analysis / Corrective Action Plan",
        registry.profile().name
    );
    let _ = writeln!(
        output,
        "NAICS {} - {} (generated {})",
        dataset.code, dataset.description, generated_on
    );
    let _ = writeln!(
        output,
        "{} employees across {} locations",
        registry.profile().total_employees,
        registry.profile().locations
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Injury Trends (per 100 FTE)");

    if series.is_empty() {
        let _ = writeln!(output, "No rate data recorded for this category.");
    } else {
        let legend = mapper::series_legend();
        let _ = writeln!(
            output,
            "| Year | {} | {} | {} | TRIR | DART |",
            legend[0].label, legend[1].label, legend[2].label
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for (point, record) in series.iter().zip(&dataset.injury_rates) {
            let _ = writeln!(
                output,
                "| {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} |",
                point.year,
                point.days_away,
                point.restricted,
                point.other,
                record.total(),
                record.dart()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Injury Types");

    if slices.is_empty() {
        let _ = writeln!(output, "No injury type breakdown recorded.");
    } else {
        for slice in &slices {
            let _ = writeln!(
                output,
                "- {}: {} ({})",
                slice.name, slice.percent_label, slice.color
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cases by Body Part");
    for part in &body_parts {
        let _ = writeln!(
            output,
            "{}. {}: {} cases ({})",
            part.rank, part.name, part.cases, part.share_label
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Prevention Opportunities");
    for category in &dataset.prevention {
        let badge = mapper::badge_style(category.priority);
        let _ = writeln!(
            output,
            "### {} [{} Priority] ({} {})",
            category.category, category.priority, badge.background, badge.text
        );
        for opportunity in &category.opportunities {
            let _ = writeln!(output, "- [ ] {}", opportunity);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Performance Indicators");
    let mut current_group: Option<&str> = None;
    for kpi in registry.kpis() {
        if current_group != Some(kpi.group.as_str()) {
            let _ = writeln!(output, "### {}", kpi.group);
            current_group = Some(kpi.group.as_str());
        }
        let _ = writeln!(
            output,
            "- {}: target {} ({})",
            kpi.name,
            mapper::kpi_display(kpi),
            kpi.basis
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## EHS Activity Schedule");
    for block in registry.schedule() {
        let _ = writeln!(output, "### {}", block.cadence.as_str());
        for activity in &block.activities {
            let _ = writeln!(output, "- {}", activity);
        }
    }

    let totals = mapper::visit_totals(registry.visit_plan());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Site Visit Plan");
    for tier in registry.visit_plan() {
        let _ = writeln!(
            output,
            "- {} ({}): {} sites",
            tier.name, tier.frequency, tier.sites
        );
    }
    let _ = writeln!(
        output,
        "Total: {} visits/year, {} out-of-state ({}%) + {} local",
        totals.total, totals.out_of_state, totals.out_of_state_percent, totals.local
    );

    if !registry.coverage().is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Out-of-State Coverage Areas");
        for region in registry.coverage() {
            let _ = writeln!(
                output,
                "- {} - {} ({} sites)",
                region.region,
                region.cities.join(", "),
                region.sites
            );
        }
    }

    if !registry.calendar().is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Site Visit Calendar");
        for month in registry.calendar() {
            let label = NaiveDate::from_ymd_opt(month.year, month.month, 1)
                .map(|date| date.format("%B %Y").to_string())
                .unwrap_or_else(|| format!("{}-{:02}", month.year, month.month));
            let visits: Vec<String> = month
                .visits
                .iter()
                .map(|visit| format!("{} ({})", visit.site, visit.cycle))
                .collect();
            let _ = writeln!(output, "- {}: {}", label, visits.join("; "));
        }
    }

    if !registry.objectives().is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Standard Visit Objectives");
        for objective in registry.objectives() {
            let _ = writeln!(output, "- [ ] {}", objective);
        }
    }

    if !registry.deliverables().is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Post-Visit Deliverables");
        for deliverable in registry.deliverables() {
            let _ = writeln!(output, "- {}: {}", deliverable.name, deliverable.due);
        }
    }

    if let Some(heat) = heat {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Monthly Incident Heat Map ({})", heat.label);
        output.push_str(&render_heat_grid(heat.cells));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Sources");
    for source in registry.sources() {
        let _ = writeln!(output, "- {} {}: {}", source.agency, source.label, source.url);
    }

    Ok(output)
}

/// One row per year, one glyph per month.
pub fn render_heat_grid(cells: &[HeatGridCell]) -> String {
    let mut output = String::new();
    let mut years: Vec<i32> = Vec::new();
    for cell in cells {
        if !years.contains(&cell.year) {
            years.push(cell.year);
        }
    }

    let _ = writeln!(output, "```");
    let _ = writeln!(output, "year  J F M A M J J A S O N D");
    for year in years {
        let mut row = [IntensityBand::None.glyph(); 12];
        for cell in cells.iter().filter(|c| c.year == year) {
            if let Some(slot) = row.get_mut(cell.month.saturating_sub(1) as usize) {
                *slot = cell.band.glyph();
            }
        }
        let glyphs: Vec<String> = row.iter().map(|g| g.to_string()).collect();
        let _ = writeln!(output, "{}  {}", year, glyphs.join(" "));
    }
    let _ = writeln!(output, "```");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn report_covers_every_section() {
        let registry = Registry::builtin();
        let dataset = registry.category("423840").unwrap();
        let report = build_report(&registry, dataset, None, generated()).unwrap();

        assert!(report.contains("NAICS 423840 - Industrial Supplies Merchant Wholesalers"));
        assert!(report.contains("| 2023 | 0.8 | 1.0 | 0.7 | 2.5 | 1.8 |"));
        assert!(report.contains("- Strains/Sprains/Tears: 33%"));
        assert!(report.contains("1. Back: 28 cases (28%)"));
        assert!(report.contains("### Slip, Trip & Fall Prevention [Medium Priority]"));
        assert!(report.contains("Total Recordable Incident Rate (TRIR): target <2.0"));
        assert!(report.contains("Total: 48 visits/year, 36 out-of-state (75%) + 12 local"));
        assert!(report.contains("- Pacific Northwest - Portland, Seattle, Tacoma (5 sites)"));
        assert!(report.contains("- January 2025: Oakland DC (Quarterly); Reno, NV (Annual)"));
        assert!(report.contains("- Site Audit Report: Within 5 days"));
        assert!(report.contains("- [ ] Review regulatory compliance and documentation"));
        assert!(!report.contains("Heat Map"));
    }

    #[test]
    fn heat_grid_renders_one_row_per_year() {
        let cells = vec![
            HeatGridCell {
                month: 1,
                year: 2023,
                incidents: 8,
                band: IntensityBand::Critical,
            },
            HeatGridCell {
                month: 3,
                year: 2024,
                incidents: 2,
                band: IntensityBand::Low,
            },
        ];
        let grid = render_heat_grid(&cells);
        assert!(grid.contains("2023  4 . . . . . . . . . . ."));
        assert!(grid.contains("2024  . . 1 . . . . . . . . ."));
    }

    #[test]
    fn report_includes_heat_section_when_given() {
        let registry = Registry::builtin();
        let dataset = registry.category("423830").unwrap();
        let cells = [HeatGridCell {
            month: 2,
            year: 2023,
            incidents: 1,
            band: IntensityBand::Low,
        }];
        let report = build_report(
            &registry,
            dataset,
            Some(HeatSection {
                label: "synthetic placeholder",
                cells: &cells,
            }),
            generated(),
        )
        .unwrap();
        assert!(report.contains("## Monthly Incident Heat Map (synthetic placeholder)"));
    }
}
