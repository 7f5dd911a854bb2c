use super::domain::PermitRecord;
use super::PermitLoadError;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Column headers the extract must carry. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "PermitNum",
    "StatusCurrent",
    "PermitClass",
    "PermitTypeDesc",
    "OriginalZip",
    "Longitude",
    "Latitude",
    "EstProjectCost",
    "HousingUnitsAdded",
    "HousingUnitsRemoved",
];

/// One row of the extract as read from disk, before any coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPermitRecord {
    #[serde(rename = "PermitNum", default, deserialize_with = "empty_string_as_none")]
    pub permit_number: Option<String>,
    #[serde(
        rename = "StatusCurrent",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub status: Option<String>,
    #[serde(rename = "PermitClass", default, deserialize_with = "empty_string_as_none")]
    pub permit_class: Option<String>,
    #[serde(
        rename = "PermitTypeDesc",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub permit_type: Option<String>,
    #[serde(rename = "OriginalZip", default, deserialize_with = "empty_string_as_none")]
    pub zip_code: Option<String>,
    #[serde(rename = "Longitude", default, deserialize_with = "empty_string_as_none")]
    pub longitude: Option<String>,
    #[serde(rename = "Latitude", default, deserialize_with = "empty_string_as_none")]
    pub latitude: Option<String>,
    #[serde(
        rename = "EstProjectCost",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub estimated_cost: Option<String>,
    #[serde(
        rename = "HousingUnitsAdded",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub housing_units_added: Option<String>,
    #[serde(
        rename = "HousingUnitsRemoved",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub housing_units_removed: Option<String>,
}

impl From<&PermitRecord> for RawPermitRecord {
    /// Re-expresses a cleaned permit as an active raw row carrying its original class.
    fn from(record: &PermitRecord) -> Self {
        Self {
            permit_number: Some(record.permit_number.clone()),
            status: None,
            permit_class: Some(record.original_class.clone()),
            permit_type: Some(record.permit_type.label().to_string()),
            zip_code: Some(record.zip_code.clone()),
            longitude: Some(record.longitude.to_string()),
            latitude: Some(record.latitude.to_string()),
            estimated_cost: Some(record.estimated_cost.to_string()),
            housing_units_added: Some(record.housing_units_added.to_string()),
            housing_units_removed: Some(record.housing_units_removed.to_string()),
        }
    }
}

pub fn parse_records<R: Read>(reader: R) -> Result<Vec<RawPermitRecord>, PermitLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PermitLoadError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for record in csv_reader.deserialize::<RawPermitRecord>() {
        records.push(record?);
    }

    Ok(records)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "PermitNum,StatusCurrent,PermitClass,PermitClassMapped,PermitTypeDesc,OriginalZip,Longitude,Latitude,EstProjectCost,HousingUnitsAdded,HousingUnitsRemoved";

    #[test]
    fn blank_cells_become_none_and_extra_columns_are_ignored() {
        let csv = format!(
            "{HEADER}\n6789012-CN,Issued,Multifamily,Residential,New,98103,-122.35,47.66,,4,\n"
        );
        let mut records = parse_records(Cursor::new(csv)).expect("parse");
        let record = records.pop().expect("record");
        assert_eq!(record.permit_number.as_deref(), Some("6789012-CN"));
        assert_eq!(record.zip_code.as_deref(), Some("98103"));
        assert_eq!(record.estimated_cost, None);
        assert_eq!(record.housing_units_added.as_deref(), Some("4"));
        assert_eq!(record.housing_units_removed, None);
    }

    #[test]
    fn quoted_and_padded_values_are_trimmed() {
        let csv = format!(
            "{HEADER}\n\" 6789013-DM \",Reviews In Process,\"Single Family/Duplex\",Residential, Demolition ,98115.0,-122.30,47.68,15000,0,1\n"
        );
        let record = parse_records(Cursor::new(csv))
            .expect("parse")
            .pop()
            .expect("record");
        assert_eq!(record.permit_number.as_deref(), Some("6789013-DM"));
        assert_eq!(record.permit_type.as_deref(), Some("Demolition"));
        assert_eq!(record.zip_code.as_deref(), Some("98115.0"));
    }

    #[test]
    fn missing_required_columns_are_reported_by_name() {
        let csv = "PermitNum,StatusCurrent,PermitClass\n1,Issued,Commercial\n";
        let err = parse_records(Cursor::new(csv)).expect_err("schema rejected");
        match err {
            PermitLoadError::MissingColumns(columns) => {
                assert!(columns.contains(&"Latitude".to_string()));
                assert!(columns.contains(&"OriginalZip".to_string()));
                assert!(!columns.contains(&"PermitNum".to_string()));
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn header_only_extract_yields_no_rows() {
        let records = parse_records(Cursor::new(format!("{HEADER}\n"))).expect("parse");
        assert!(records.is_empty());
    }
}
