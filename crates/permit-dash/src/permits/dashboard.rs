use super::domain::{CategoryField, Measure, PermitClass, PermitType, ZipSelection};
use super::snapshot::PermitSnapshot;
use serde::Serialize;

pub const DASHBOARD_TITLE: &str = "Active Construction Permits in Seattle";
pub const DATA_SOURCE: &str = "https://data.seattle.gov/";

/// Filter state of the dashboard controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pub zips: ZipSelection,
    pub color_by: CategoryField,
    pub measure: Measure,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub category: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub permit_number: String,
    pub zip_code: String,
    pub permit_class: PermitClass,
    pub permit_type: PermitType,
    pub longitude: f64,
    pub latitude: f64,
    pub color_key: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    pub color_by: CategoryField,
    pub legend: Vec<LegendEntry>,
    pub points: Vec<MapPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarEntry {
    pub zip_code: String,
    pub category: &'static str,
    pub value: f64,
    pub count: usize,
    pub total: usize,
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub field: CategoryField,
    pub measure: Measure,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_format: Option<&'static str>,
    pub show_zip_labels: bool,
    pub legend: Vec<LegendEntry>,
    pub bars: Vec<BarEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub data_source: &'static str,
    pub selected_zips: Vec<String>,
    pub map: MapLayer,
    pub class_chart: BarChart,
    pub type_chart: BarChart,
}

impl PermitSnapshot {
    /// Recomputes the map and both bar charts for the current control state.
    pub fn dashboard(&self, query: &DashboardQuery) -> DashboardView {
        DashboardView {
            title: DASHBOARD_TITLE,
            data_source: DATA_SOURCE,
            selected_zips: query.zips.selected().map(str::to_string).collect(),
            map: self.map_layer(&query.zips, query.color_by),
            class_chart: self.bar_chart(CategoryField::Class, query.measure, &query.zips),
            type_chart: self.bar_chart(CategoryField::Type, query.measure, &query.zips),
        }
    }

    fn map_layer(&self, selection: &ZipSelection, color_by: CategoryField) -> MapLayer {
        let points = self
            .records(selection)
            .into_iter()
            .map(|record| MapPoint {
                permit_number: record.permit_number.clone(),
                zip_code: record.zip_code.clone(),
                permit_class: record.permit_class,
                permit_type: record.permit_type,
                longitude: record.longitude,
                latitude: record.latitude,
                color_key: color_by.category_of(record),
            })
            .collect();

        MapLayer {
            color_by,
            legend: legend(color_by),
            points,
        }
    }

    fn bar_chart(
        &self,
        field: CategoryField,
        measure: Measure,
        selection: &ZipSelection,
    ) -> BarChart {
        let bars = self
            .aggregate(field, selection)
            .into_iter()
            .map(|row| BarEntry {
                zip_code: row.zip_code.clone(),
                category: row.category,
                value: match measure {
                    Measure::Percent => row.ratio,
                    Measure::Total => row.count as f64,
                },
                count: row.count,
                total: row.total,
                ratio: row.ratio,
            })
            .collect();

        BarChart {
            field,
            measure,
            title: format!(
                "{} of Each Permit {} Per Zip Code",
                measure.label(),
                field.label()
            ),
            tick_format: match measure {
                Measure::Percent => Some("%"),
                Measure::Total => None,
            },
            show_zip_labels: !selection.is_all(),
            legend: legend(field),
            bars,
        }
    }
}

fn legend(field: CategoryField) -> Vec<LegendEntry> {
    field
        .palette()
        .into_iter()
        .map(|(category, color)| LegendEntry { category, color })
        .collect()
}
