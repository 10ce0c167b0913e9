use std::io;

use serde::Serialize;

use crate::error::Result;
use crate::mapper::{self, BadgeStyle, HeatGridCell, PieSlice, RankedBodyPart, SeriesKey, StackedPoint};
use crate::models::{CategoryCode, PreventionCategory};
use crate::registry::Registry;

#[derive(Debug, Clone, Serialize)]
pub struct PreventionView {
    #[serde(flatten)]
    pub category: PreventionCategory,
    pub badge: BadgeStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatView {
    pub source: String,
    pub cells: Vec<HeatGridCell>,
}

/// Every view model the dashboard renders for one category.
#[derive(Debug, Clone, Serialize)]
pub struct ViewBundle {
    pub code: CategoryCode,
    pub description: String,
    pub legend: Vec<SeriesKey>,
    pub series: Vec<StackedPoint>,
    pub slices: Vec<PieSlice>,
    pub body_parts: Vec<RankedBodyPart>,
    pub prevention: Vec<PreventionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<HeatView>,
}

pub fn build_bundle(registry: &Registry, code: &str, heatmap: Option<HeatView>) -> Result<ViewBundle> {
    let dataset = registry.category(code)?;

    Ok(ViewBundle {
        code: dataset.code.clone(),
        description: dataset.description.clone(),
        legend: mapper::series_legend().to_vec(),
        series: mapper::to_stacked_series(&dataset.injury_rates),
        slices: mapper::to_pie_slices(&dataset.injury_types)?,
        body_parts: mapper::rank_body_parts(registry.body_parts()),
        prevention: dataset
            .prevention
            .iter()
            .map(|category| PreventionView {
                category: category.clone(),
                badge: mapper::badge_style(category.priority),
            })
            .collect(),
        heatmap,
    })
}

pub fn to_json(bundle: &ViewBundle) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(bundle)?)
}

pub fn series_csv<W: io::Write>(series: &[StackedPoint], writer: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for point in series {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_serializes_chart_contract() {
        let registry = Registry::builtin();
        let bundle = build_bundle(&registry, "423830", None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&bundle).unwrap()).unwrap();

        assert_eq!(value["code"], "423830");
        assert_eq!(value["series"][0]["daysAway"], 1.3);
        assert_eq!(value["slices"][0]["percentLabel"], "35%");
        assert_eq!(value["prevention"][3]["priority"], "Medium");
        assert_eq!(value["prevention"][3]["badge"]["background"], "bg-yellow-100");
        assert!(value.get("heatmap").is_none());
    }

    #[test]
    fn bundle_for_unknown_code_fails() {
        let registry = Registry::builtin();
        assert!(build_bundle(&registry, "000000", None).is_err());
    }

    #[test]
    fn heat_bands_serialize_upper_case() {
        let registry = Registry::builtin();
        let heatmap = HeatView {
            source: "observed".to_string(),
            cells: vec![HeatGridCell {
                month: 1,
                year: 2023,
                incidents: 0,
                band: mapper::IntensityBand::None,
            }],
        };
        let bundle = build_bundle(&registry, "423840", Some(heatmap)).unwrap();
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["heatmap"]["cells"][0]["band"], "NONE");
    }

    #[test]
    fn series_csv_has_header_and_rows() {
        let registry = Registry::builtin();
        let dataset = registry.category("423830").unwrap();
        let series = mapper::to_stacked_series(&dataset.injury_rates);

        let mut buffer = Vec::new();
        series_csv(&series, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "year,daysAway,restricted,other");
        assert_eq!(lines[1], "2020,1.3,1.2,0.8");
        assert_eq!(lines.len(), 5);
    }
}
