use crate::infra::{parse_category_field, parse_measure};
use chrono::SecondsFormat;
use clap::Args;
use permit_dash::config::AppConfig;
use permit_dash::error::AppError;
use permit_dash::permits::{
    CategoryField, CleaningReport, Measure, PermitSnapshot, ZipSelection, DASHBOARD_TITLE,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Permit extract to load (defaults to APP_PERMITS_CSV)
    #[arg(long)]
    pub(crate) permits: Option<PathBuf>,
    /// Restrict the breakdown to a zip code. Repeat for several; omit for all.
    #[arg(long = "zip")]
    pub(crate) zips: Vec<String>,
    /// Break permits down by `class` or `type`
    #[arg(long, default_value = "class", value_parser = parse_category_field)]
    pub(crate) by: CategoryField,
    /// Show shares (`percent`) or raw counts (`total`)
    #[arg(long, default_value = "percent", value_parser = parse_measure)]
    pub(crate) measure: Measure,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        permits,
        zips,
        by,
        measure,
    } = args;

    let path = match permits {
        Some(path) => path,
        None => AppConfig::load()?.data.permits_csv,
    };
    let snapshot = PermitSnapshot::from_path(&path)?;
    let selection = ZipSelection::new(zips);

    for line in report_lines(&snapshot, &selection, by, measure) {
        println!("{line}");
    }
    Ok(())
}

fn report_lines(
    snapshot: &PermitSnapshot,
    selection: &ZipSelection,
    field: CategoryField,
    measure: Measure,
) -> Vec<String> {
    let metadata = snapshot.metadata();
    let report = snapshot.report();
    let mut lines = vec![
        DASHBOARD_TITLE.to_string(),
        format!(
            "Source: {} (loaded {})",
            metadata.source.as_deref().unwrap_or("<inline>"),
            metadata.loaded_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!(
            "Rows read: {} | kept: {} | dropped: {}",
            report.rows_read,
            report.kept,
            report.dropped()
        ),
    ];

    let reasons = drop_reasons(report);
    if !reasons.is_empty() {
        lines.push("Dropped rows:".to_string());
        lines.extend(
            reasons
                .into_iter()
                .map(|(reason, count)| format!("- {reason}: {count}")),
        );
    }

    lines.push(String::new());
    lines.push(format!(
        "{} of Each Permit {} Per Zip Code",
        measure.label(),
        field.label()
    ));

    let rows = snapshot.aggregate(field, selection);
    if rows.is_empty() {
        lines.push("No active permits match the selected zip codes.".to_string());
        return lines;
    }

    let mut current_zip: Option<&str> = None;
    for row in &rows {
        if current_zip != Some(row.zip_code.as_str()) {
            lines.push(format!("{} ({} permits)", row.zip_code, row.total));
            current_zip = Some(row.zip_code.as_str());
        }
        let value = match measure {
            Measure::Percent => format!("{:.2}%", row.ratio * 100.0),
            Measure::Total => row.count.to_string(),
        };
        lines.push(format!("  - {}: {}", row.category, value));
    }

    lines
}

fn drop_reasons(report: &CleaningReport) -> Vec<(&'static str, usize)> {
    [
        ("inactive status", report.inactive),
        ("missing zip", report.missing_zip),
        ("unparseable zip", report.invalid_zip),
        ("missing location", report.missing_location),
        ("zip code 0", report.zero_zip),
        ("excluded permit type", report.excluded_type),
        ("missing class", report.missing_class),
        ("unrecognised class", report.unknown_class),
        ("missing permit fields", report.incomplete),
        ("malformed values", report.malformed),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "PermitNum,StatusCurrent,PermitClass,PermitTypeDesc,OriginalZip,Longitude,Latitude,EstProjectCost,HousingUnitsAdded,HousingUnitsRemoved\n\
A1,Issued,Commercial,New,98101,-122.33,47.61,1000,,\n\
A2,Issued,Multifamily,New,98101,-122.33,47.61,,4,0\n\
A3,Reviews In Process,Industrial,Demolition,98101,-122.33,47.61,,,\n\
B1,Issued,Single Family/Duplex,Addition/Alteration,98103,-122.35,47.66,,,\n\
C1,Completed,Commercial,New,98103,-122.35,47.66,,,\n";

    fn snapshot() -> PermitSnapshot {
        PermitSnapshot::from_reader(SAMPLE.as_bytes()).expect("sample loads")
    }

    #[test]
    fn percent_breakdown_groups_rows_under_each_zip() {
        let lines = report_lines(
            &snapshot(),
            &ZipSelection::all(),
            CategoryField::Class,
            Measure::Percent,
        );

        assert_eq!(lines[0], DASHBOARD_TITLE);
        assert!(lines[1].starts_with("Source: <inline> (loaded "));
        assert_eq!(lines[2], "Rows read: 5 | kept: 4 | dropped: 1");
        assert_eq!(lines[3], "Dropped rows:");
        assert_eq!(lines[4], "- inactive status: 1");
        assert_eq!(
            &lines[6..],
            [
                "Percent of Each Permit Class Per Zip Code",
                "98101 (3 permits)",
                "  - Multifamily: 33.33%",
                "  - Non-Residential: 66.67%",
                "98103 (1 permits)",
                "  - Single Family/Duplex: 100.00%",
            ]
        );
    }

    #[test]
    fn total_breakdown_respects_zip_selection() {
        let lines = report_lines(
            &snapshot(),
            &ZipSelection::new(["98101"]),
            CategoryField::Type,
            Measure::Total,
        );
        let tail = &lines[lines.len() - 4..];
        assert_eq!(
            tail,
            [
                "Total of Each Permit Type Per Zip Code",
                "98101 (3 permits)",
                "  - Demolition: 1",
                "  - New: 2",
            ]
        );
    }

    #[test]
    fn unmatched_selection_reports_no_permits() {
        let lines = report_lines(
            &snapshot(),
            &ZipSelection::new(["98199"]),
            CategoryField::Class,
            Measure::Percent,
        );
        assert_eq!(
            lines.last().map(String::as_str),
            Some("No active permits match the selected zip codes.")
        );
    }
}
