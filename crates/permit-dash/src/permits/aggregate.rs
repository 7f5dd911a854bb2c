use super::domain::{CategoryField, PermitRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const RATIO_SCALE: usize = 10_000;

/// Count of permits in one category for one zip, alongside the zip-wide total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipCategoryAggregate {
    pub zip_code: String,
    pub category: &'static str,
    pub count: usize,
    pub total: usize,
    pub ratio: f64,
}

/// Groups records by `(zip, category)` and attaches each zip's total and share.
///
/// Rows come back ordered by zip, then category label. Categories without any
/// permits in a zip get no row at all rather than a zero row.
pub fn aggregate_by_category(
    records: &[PermitRecord],
    field: CategoryField,
) -> Vec<ZipCategoryAggregate> {
    let mut counts: BTreeMap<(&str, &'static str), usize> = BTreeMap::new();
    for record in records {
        *counts
            .entry((record.zip_code.as_str(), field.category_of(record)))
            .or_default() += 1;
    }

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for ((zip, _), count) in &counts {
        *totals.entry(*zip).or_default() += count;
    }

    counts
        .into_iter()
        .map(|((zip, category), count)| {
            let total = totals.get(zip).copied().unwrap_or(count);
            ZipCategoryAggregate {
                zip_code: zip.to_string(),
                category,
                count,
                total,
                ratio: rounded_ratio(count, total),
            }
        })
        .collect()
}

/// `count / total` rounded to four decimals, ties to even.
///
/// Worked in integers so a tie such as `1 / 32 = 0.03125` is detected exactly
/// and lands on `0.0312`.
pub fn rounded_ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let scaled = count * RATIO_SCALE;
    let mut quotient = scaled / total;
    let twice_remainder = 2 * (scaled % total);
    if twice_remainder > total || (twice_remainder == total && quotient % 2 == 1) {
        quotient += 1;
    }

    quotient as f64 / RATIO_SCALE as f64
}

/// Distinct zip codes, ascending as strings.
pub fn unique_zips(records: &[PermitRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.zip_code.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permits::domain::{EstimatedCost, PermitClass, PermitType};

    fn record(zip: &str, permit_type: PermitType, class: PermitClass) -> PermitRecord {
        PermitRecord {
            permit_number: format!("{zip}-{}", permit_type.label()),
            permit_class: class,
            permit_type,
            housing_units_removed: 0,
            housing_units_added: 0,
            zip_code: zip.to_string(),
            longitude: -122.33,
            latitude: 47.61,
            estimated_cost: EstimatedCost::Unknown,
            original_class: class.label().to_string(),
        }
    }

    #[test]
    fn class_breakdown_for_a_single_zip() {
        let records = vec![
            record("98101", PermitType::New, PermitClass::NonResidential),
            record("98101", PermitType::New, PermitClass::Multifamily),
            record("98101", PermitType::Demolition, PermitClass::NonResidential),
        ];

        let rows = aggregate_by_category(&records, CategoryField::Class);
        assert_eq!(
            rows,
            vec![
                ZipCategoryAggregate {
                    zip_code: "98101".to_string(),
                    category: "Multifamily",
                    count: 1,
                    total: 3,
                    ratio: 0.3333,
                },
                ZipCategoryAggregate {
                    zip_code: "98101".to_string(),
                    category: "Non-Residential",
                    count: 2,
                    total: 3,
                    ratio: 0.6667,
                },
            ]
        );
    }

    #[test]
    fn absent_categories_get_no_zero_rows() {
        let records = vec![
            record("98103", PermitType::New, PermitClass::Multifamily),
            record("98115", PermitType::Demolition, PermitClass::SingleFamilyDuplex),
            record("98115", PermitType::Demolition, PermitClass::SingleFamilyDuplex),
        ];

        let rows = aggregate_by_category(&records, CategoryField::Type);
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .all(|row| row.count == row.total && row.ratio == 1.0));
        assert!(!rows
            .iter()
            .any(|row| row.zip_code == "98103" && row.category == "Demolition"));
    }

    #[test]
    fn totals_and_ratios_are_consistent_per_zip() {
        let types = [PermitType::AdditionAlteration, PermitType::New, PermitType::Demolition];
        let zips = ["98101", "98103", "98122"];
        let records: Vec<_> = (0..97)
            .map(|i| {
                record(
                    zips[i % zips.len()],
                    types[(i * 7 / 3) % types.len()],
                    PermitClass::SingleFamilyDuplex,
                )
            })
            .collect();

        let rows = aggregate_by_category(&records, CategoryField::Type);
        for zip in zips {
            let zip_rows: Vec<_> = rows.iter().filter(|row| row.zip_code == zip).collect();
            let total = zip_rows[0].total;
            assert!(zip_rows.iter().all(|row| row.total == total));
            assert_eq!(zip_rows.iter().map(|row| row.count).sum::<usize>(), total);
            let ratio_sum: f64 = zip_rows.iter().map(|row| row.ratio).sum();
            assert!((ratio_sum - 1.0).abs() <= 0.0001 + 1e-9, "{zip}: {ratio_sum}");
        }
    }

    #[test]
    fn ratio_rounding_breaks_ties_to_even() {
        assert_eq!(rounded_ratio(1, 32), 0.0312);
        assert_eq!(rounded_ratio(3, 32), 0.0938);
        assert_eq!(rounded_ratio(2, 3), 0.6667);
        assert_eq!(rounded_ratio(1, 3), 0.3333);
        assert_eq!(rounded_ratio(5, 5), 1.0);
        assert_eq!(rounded_ratio(0, 0), 0.0);
    }

    #[test]
    fn unique_zips_sort_as_strings() {
        let records = vec![
            record("98122", PermitType::New, PermitClass::Multifamily),
            record("02134", PermitType::New, PermitClass::Multifamily),
            record("98101", PermitType::New, PermitClass::Multifamily),
            record("98122", PermitType::New, PermitClass::Multifamily),
        ];
        assert_eq!(unique_zips(&records), ["02134", "98101", "98122"]);
        assert!(unique_zips(&[]).is_empty());
    }

    #[test]
    fn empty_records_produce_empty_aggregates() {
        assert!(aggregate_by_category(&[], CategoryField::Class).is_empty());
    }
}
