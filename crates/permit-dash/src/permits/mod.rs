//! Building-permit ingestion: CSV parsing, cleaning, per-zip aggregation, and
//! the read-only query surface the dashboard is drawn from.

pub mod aggregate;
pub mod cleaning;
mod dashboard;
pub mod domain;
pub mod parser;
pub mod router;
mod snapshot;

pub use aggregate::{aggregate_by_category, rounded_ratio, unique_zips, ZipCategoryAggregate};
pub use cleaning::{clean, CleanedPermits, CleaningReport};
pub use dashboard::{
    BarChart, BarEntry, DashboardQuery, DashboardView, LegendEntry, MapLayer, MapPoint,
    DASHBOARD_TITLE, DATA_SOURCE,
};
pub use domain::{
    CategoryField, EstimatedCost, Measure, PermitClass, PermitRecord, PermitType, ZipSelection,
};
pub use parser::{parse_records, RawPermitRecord, REQUIRED_COLUMNS};
pub use router::permit_router;
pub use snapshot::{PermitSnapshot, SnapshotMetadata};

/// Failures that prevent the extract from being loaded at all.
#[derive(Debug, thiserror::Error)]
pub enum PermitLoadError {
    #[error("failed to read permit extract: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid permit CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("permit extract is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}
