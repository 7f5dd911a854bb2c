use super::domain::{EstimatedCost, PermitClass, PermitRecord, PermitType};
use super::parser::RawPermitRecord;
use serde::Serialize;
use tracing::{debug, info};

/// Statuses of permits that are no longer active.
pub const INACTIVE_STATUSES: [&str; 5] = ["Completed", "Closed", "Expired", "Canceled", "Withdrawn"];

/// Raw classes folded into [`PermitClass::NonResidential`].
pub const NON_RESIDENTIAL_CLASSES: [&str; 4] =
    ["Commercial", "Institutional", "Industrial", "Vacant Land"];

/// Per-stage tally of rows removed by [`clean`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub kept: usize,
    pub inactive: usize,
    pub missing_zip: usize,
    pub invalid_zip: usize,
    pub missing_location: usize,
    pub zero_zip: usize,
    pub excluded_type: usize,
    pub missing_class: usize,
    pub unknown_class: usize,
    pub incomplete: usize,
    pub malformed: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.rows_read - self.kept
    }

    /// Rows that had the right shape but failed coercion or were missing a retained field.
    pub fn schema_violations(&self) -> usize {
        self.invalid_zip + self.missing_class + self.unknown_class + self.incomplete + self.malformed
    }

    fn record(&mut self, reason: DropReason) {
        let counter = match reason {
            DropReason::Inactive => &mut self.inactive,
            DropReason::MissingZip => &mut self.missing_zip,
            DropReason::InvalidZip => &mut self.invalid_zip,
            DropReason::MissingLocation => &mut self.missing_location,
            DropReason::ZeroZip => &mut self.zero_zip,
            DropReason::ExcludedType => &mut self.excluded_type,
            DropReason::MissingClass => &mut self.missing_class,
            DropReason::UnknownClass => &mut self.unknown_class,
            DropReason::Incomplete => &mut self.incomplete,
            DropReason::Malformed => &mut self.malformed,
        };
        *counter += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleanedPermits {
    pub records: Vec<PermitRecord>,
    pub report: CleaningReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    Inactive,
    MissingZip,
    InvalidZip,
    MissingLocation,
    ZeroZip,
    ExcludedType,
    MissingClass,
    UnknownClass,
    Incomplete,
    Malformed,
}

/// Filters the raw extract down to active, located permits of the charted types.
///
/// Rows are checked stage by stage in this order: status, zip presence and
/// coercion, latitude and zero zip, permit type, then the remaining retained
/// fields. A row is attributed to the first stage that rejects it.
pub fn clean<I>(raw_records: I) -> CleanedPermits
where
    I: IntoIterator<Item = RawPermitRecord>,
{
    let mut report = CleaningReport::default();
    let mut records = Vec::new();

    for raw in raw_records {
        report.rows_read += 1;
        match clean_record(raw) {
            Ok(record) => records.push(record),
            Err(reason) => report.record(reason),
        }
    }
    report.kept = records.len();

    info!(
        rows_read = report.rows_read,
        kept = report.kept,
        dropped = report.dropped(),
        schema_violations = report.schema_violations(),
        "permit extract cleaned"
    );
    debug!(?report, "permit cleaning breakdown");

    CleanedPermits { records, report }
}

fn clean_record(raw: RawPermitRecord) -> Result<PermitRecord, DropReason> {
    if raw
        .status
        .as_deref()
        .is_some_and(|status| INACTIVE_STATUSES.contains(&status))
    {
        return Err(DropReason::Inactive);
    }

    let zip = raw.zip_code.as_deref().ok_or(DropReason::MissingZip)?;
    let zip = parse_whole_number(zip).ok_or(DropReason::InvalidZip)?;

    let latitude = raw
        .latitude
        .as_deref()
        .and_then(parse_coordinate)
        .ok_or(DropReason::MissingLocation)?;
    if zip == 0 {
        return Err(DropReason::ZeroZip);
    }

    let permit_type = raw
        .permit_type
        .as_deref()
        .and_then(PermitType::from_label)
        .ok_or(DropReason::ExcludedType)?;

    let original_class = raw.permit_class.ok_or(DropReason::MissingClass)?;
    let permit_class =
        PermitClass::from_label(remap_class(&original_class)).ok_or(DropReason::UnknownClass)?;
    let permit_number = raw.permit_number.ok_or(DropReason::Incomplete)?;
    let longitude = raw
        .longitude
        .as_deref()
        .and_then(parse_coordinate)
        .ok_or(DropReason::Incomplete)?;

    let estimated_cost = match raw.estimated_cost.as_deref() {
        None => EstimatedCost::Unknown,
        Some(value) => parse_cost(value).ok_or(DropReason::Malformed)?,
    };
    let housing_units_added = parse_units(raw.housing_units_added.as_deref())?;
    let housing_units_removed = parse_units(raw.housing_units_removed.as_deref())?;

    Ok(PermitRecord {
        permit_number,
        permit_class,
        permit_type,
        housing_units_removed,
        housing_units_added,
        zip_code: format_zip(zip),
        longitude,
        latitude,
        estimated_cost,
        original_class,
    })
}

/// Folds the non-residential subclasses into a single label; other values pass through.
pub fn remap_class(raw: &str) -> &str {
    if NON_RESIDENTIAL_CLASSES.contains(&raw) {
        PermitClass::NonResidential.label()
    } else {
        raw
    }
}

/// Zips are charted as five digit strings so `02134` keeps its leading zero.
pub fn format_zip(zip: u32) -> String {
    format!("{zip:05}")
}

/// Accepts `98101` as well as the float rendering `98101.0`.
fn parse_whole_number(value: &str) -> Option<u32> {
    let parsed = value.trim().parse::<f64>().ok()?;
    if !parsed.is_finite() || parsed < 0.0 || parsed.fract() != 0.0 || parsed > u32::MAX as f64 {
        return None;
    }
    Some(parsed as u32)
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|coordinate| coordinate.is_finite())
}

fn parse_cost(value: &str) -> Option<EstimatedCost> {
    if value.trim().eq_ignore_ascii_case(EstimatedCost::UNKNOWN_LABEL) {
        return Some(EstimatedCost::Unknown);
    }
    parse_coordinate(value).map(EstimatedCost::Amount)
}

fn parse_units(value: Option<&str>) -> Result<u32, DropReason> {
    match value {
        None => Ok(0),
        Some(value) => parse_whole_number(value).ok_or(DropReason::Malformed),
    }
}
