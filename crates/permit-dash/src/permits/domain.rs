use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

/// Coarse construction category after folding the non-residential subclasses together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PermitClass {
    #[serde(rename = "Single Family/Duplex")]
    SingleFamilyDuplex,
    #[serde(rename = "Multifamily")]
    Multifamily,
    #[serde(rename = "Non-Residential")]
    NonResidential,
}

impl PermitClass {
    pub const fn ordered() -> [Self; 3] {
        [Self::SingleFamilyDuplex, Self::Multifamily, Self::NonResidential]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleFamilyDuplex => "Single Family/Duplex",
            Self::Multifamily => "Multifamily",
            Self::NonResidential => "Non-Residential",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::SingleFamilyDuplex => "#e9a3c9",
            Self::Multifamily => "#c51b7d",
            Self::NonResidential => "#4d9221",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|class| class.label() == value.trim())
    }
}

/// Nature of the permitted work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PermitType {
    #[serde(rename = "Addition/Alteration")]
    AdditionAlteration,
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Demolition")]
    Demolition,
}

impl PermitType {
    pub const fn ordered() -> [Self; 3] {
        [Self::AdditionAlteration, Self::New, Self::Demolition]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AdditionAlteration => "Addition/Alteration",
            Self::New => "New",
            Self::Demolition => "Demolition",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::AdditionAlteration => "#67a9cf",
            Self::New => "#2166ac",
            Self::Demolition => "#b2182b",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|permit_type| permit_type.label() == value.trim())
    }
}

/// Estimated project cost; the extract leaves it blank for many permits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimatedCost {
    Unknown,
    Amount(f64),
}

impl EstimatedCost {
    pub const UNKNOWN_LABEL: &'static str = "Unknown";

    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Self::Unknown => None,
            Self::Amount(value) => Some(*value),
        }
    }
}

impl std::fmt::Display for EstimatedCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str(Self::UNKNOWN_LABEL),
            Self::Amount(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for EstimatedCost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => serializer.serialize_str(Self::UNKNOWN_LABEL),
            Self::Amount(value) => serializer.serialize_f64(*value),
        }
    }
}

/// A cleaned, location-bearing permit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermitRecord {
    pub permit_number: String,
    pub permit_class: PermitClass,
    pub permit_type: PermitType,
    pub housing_units_removed: u32,
    pub housing_units_added: u32,
    pub zip_code: String,
    pub longitude: f64,
    pub latitude: f64,
    pub estimated_cost: EstimatedCost,
    pub original_class: String,
}

/// Which categorical column a breakdown is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    #[default]
    Class,
    Type,
}

impl CategoryField {
    pub const fn ordered() -> [Self; 2] {
        [Self::Class, Self::Type]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Type => "Type",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Type => "type",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|field| field.slug() == value)
    }

    pub fn category_of(self, record: &PermitRecord) -> &'static str {
        match self {
            Self::Class => record.permit_class.label(),
            Self::Type => record.permit_type.label(),
        }
    }

    /// Category labels paired with their chart colours.
    pub fn palette(self) -> Vec<(&'static str, &'static str)> {
        match self {
            Self::Class => PermitClass::ordered()
                .into_iter()
                .map(|class| (class.label(), class.color()))
                .collect(),
            Self::Type => PermitType::ordered()
                .into_iter()
                .map(|permit_type| (permit_type.label(), permit_type.color()))
                .collect(),
        }
    }
}

/// Whether bar charts plot per-zip shares or raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    #[default]
    Percent,
    Total,
}

impl Measure {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Percent => "Percent",
            Self::Total => "Total",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percent" | "pct" => Some(Self::Percent),
            "total" | "count" => Some(Self::Total),
            _ => None,
        }
    }
}

/// Zip codes picked in the filter control. An empty selection means every zip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipSelection {
    zips: BTreeSet<String>,
}

impl ZipSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, S>(zips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let zips = zips
            .into_iter()
            .map(|zip| zip.as_ref().trim().to_string())
            .filter(|zip| !zip.is_empty())
            .collect();
        Self { zips }
    }

    /// Parses a comma separated list such as `98101,98103`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_all(&self) -> bool {
        self.zips.is_empty()
    }

    pub fn contains(&self, zip: &str) -> bool {
        self.zips.is_empty() || self.zips.contains(zip)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.zips.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for class in PermitClass::ordered() {
            assert_eq!(PermitClass::from_label(class.label()), Some(class));
        }
        for permit_type in PermitType::ordered() {
            assert_eq!(PermitType::from_label(permit_type.label()), Some(permit_type));
        }
        assert_eq!(PermitClass::from_label("Commercial"), None);
        assert_eq!(PermitType::from_label("Deconstruction"), None);
    }

    #[test]
    fn estimated_cost_serializes_unknown_as_text() {
        let unknown = serde_json::to_value(EstimatedCost::Unknown).expect("serialize");
        assert_eq!(unknown, serde_json::json!("Unknown"));
        let amount = serde_json::to_value(EstimatedCost::Amount(125000.0)).expect("serialize");
        assert_eq!(amount, serde_json::json!(125000.0));
    }

    #[test]
    fn empty_selection_matches_everything() {
        let selection = ZipSelection::parse(" , ");
        assert!(selection.is_all());
        assert!(selection.contains("98101"));

        let selection = ZipSelection::parse("98101, 98103");
        assert!(!selection.is_all());
        assert!(selection.contains("98103"));
        assert!(!selection.contains("98115"));
        assert_eq!(selection.selected().collect::<Vec<_>>(), ["98101", "98103"]);
    }

    #[test]
    fn category_field_and_measure_parse_slugs() {
        assert_eq!(CategoryField::from_slug("TYPE"), Some(CategoryField::Type));
        assert_eq!(CategoryField::from_slug("status"), None);
        assert_eq!(Measure::from_slug("total"), Some(Measure::Total));
        assert_eq!(CategoryField::Type.palette().len(), 3);
    }
}
