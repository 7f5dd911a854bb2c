use super::aggregate::{aggregate_by_category, unique_zips, ZipCategoryAggregate};
use super::cleaning::{clean, CleanedPermits, CleaningReport};
use super::domain::{CategoryField, PermitRecord, ZipSelection};
use super::parser::{self, RawPermitRecord};
use super::PermitLoadError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Immutable view of the cleaned extract and its aggregates, built once at startup.
#[derive(Debug, Clone)]
pub struct PermitSnapshot {
    records: Vec<PermitRecord>,
    by_class: Vec<ZipCategoryAggregate>,
    by_type: Vec<ZipCategoryAggregate>,
    zips: Vec<String>,
    report: CleaningReport,
    source: Option<String>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub permit_count: usize,
    pub zip_count: usize,
    pub report: CleaningReport,
}

impl PermitSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PermitLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut snapshot = Self::from_reader(file)?;
        snapshot.source = Some(path.display().to_string());
        info!(
            source = %path.display(),
            permits = snapshot.records.len(),
            zips = snapshot.zips.len(),
            "permit snapshot ready"
        );
        Ok(snapshot)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PermitLoadError> {
        let raw = parser::parse_records(reader)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_raw<I>(raw_records: I) -> Self
    where
        I: IntoIterator<Item = RawPermitRecord>,
    {
        let CleanedPermits { records, report } = clean(raw_records);
        let by_class = aggregate_by_category(&records, CategoryField::Class);
        let by_type = aggregate_by_category(&records, CategoryField::Type);
        let zips = unique_zips(&records);

        Self {
            records,
            by_class,
            by_type,
            zips,
            report,
            source: None,
            loaded_at: Utc::now(),
        }
    }

    /// Cleaned permits whose zip is in the selection.
    pub fn records(&self, selection: &ZipSelection) -> Vec<&PermitRecord> {
        self.records
            .iter()
            .filter(|record| selection.contains(&record.zip_code))
            .collect()
    }

    pub fn aggregate(
        &self,
        field: CategoryField,
        selection: &ZipSelection,
    ) -> Vec<&ZipCategoryAggregate> {
        let rows = match field {
            CategoryField::Class => &self.by_class,
            CategoryField::Type => &self.by_type,
        };
        rows.iter()
            .filter(|row| selection.contains(&row.zip_code))
            .collect()
    }

    pub fn zips(&self) -> &[String] {
        &self.zips
    }

    pub fn report(&self) -> &CleaningReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        SnapshotMetadata {
            source: self.source.clone(),
            loaded_at: self.loaded_at,
            permit_count: self.records.len(),
            zip_count: self.zips.len(),
            report: self.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV: &str = "PermitNum,StatusCurrent,PermitClass,PermitTypeDesc,OriginalZip,Longitude,Latitude,EstProjectCost,HousingUnitsAdded,HousingUnitsRemoved\n\
A1,Issued,Commercial,New,98101,-122.33,47.61,,,\n\
A2,Issued,Multifamily,New,98101,-122.33,47.61,250000,12,\n\
A3,Issued,Commercial,Demolition,98101,-122.33,47.61,,,1\n\
B1,Completed,Multifamily,New,98103,-122.35,47.66,,,\n\
C1,Reviews Completed,Single Family/Duplex,Addition/Alteration,98115.0,-122.30,47.68,,,\n";

    fn snapshot() -> PermitSnapshot {
        PermitSnapshot::from_reader(Cursor::new(CSV)).expect("snapshot loads")
    }

    #[test]
    fn empty_selection_returns_every_zip() {
        let snapshot = snapshot();
        assert_eq!(snapshot.zips(), ["98101", "98115"]);
        assert_eq!(snapshot.records(&ZipSelection::all()).len(), 4);
        assert_eq!(
            snapshot.aggregate(CategoryField::Class, &ZipSelection::all()).len(),
            3
        );
    }

    #[test]
    fn selection_filters_records_and_aggregates() {
        let snapshot = snapshot();
        let selection = ZipSelection::new(["98115"]);
        let records = snapshot.records(&selection);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].permit_number, "C1");

        let rows = snapshot.aggregate(CategoryField::Type, &selection);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Addition/Alteration");
        assert_eq!(rows[0].ratio, 1.0);
    }

    #[test]
    fn completed_permits_never_reach_the_aggregates() {
        let snapshot = snapshot();
        let selection = ZipSelection::new(["98103"]);
        assert!(snapshot.records(&selection).is_empty());
        assert!(snapshot.aggregate(CategoryField::Class, &selection).is_empty());
        assert_eq!(snapshot.report().inactive, 1);
    }

    #[test]
    fn unknown_selection_yields_an_empty_view() {
        let snapshot = snapshot();
        let selection = ZipSelection::new(["99999"]);
        assert!(snapshot.records(&selection).is_empty());
        assert!(snapshot.aggregate(CategoryField::Type, &selection).is_empty());
    }

    #[test]
    fn metadata_reflects_the_cleaning_pass() {
        let metadata = snapshot().metadata();
        assert_eq!(metadata.permit_count, 4);
        assert_eq!(metadata.zip_count, 2);
        assert_eq!(metadata.report.rows_read, 5);
        assert!(metadata.source.is_none());
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = PermitSnapshot::from_path("./does-not-exist.csv").expect_err("io error");
        match error {
            PermitLoadError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
