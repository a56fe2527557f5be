// ==========================================
// 性质测试: 日期/电话规范化与校验划分
// ==========================================


use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use suite_import::importer::{mapper_for, FieldTransformer};
use suite_import::{EntityType, Validator};
use test_helpers::*;

fn date_in(min_year: i32, max_year: i32) -> impl Strategy<Value = NaiveDate> {
    (min_year..=max_year, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("日 ≤ 28 总是合法"))
}

proptest! {
    #[test]
    fn prop_date_formats_parse_to_same_day(date in date_in(1950, 2049)) {
        let tf = FieldTransformer::default();
        let (y, m, d) = (date.year(), date.month(), date.day());

        let inputs = [
            format!("{}.{}.{}", d, m, y),
            format!("{:02}.{:02}.{}", d, m, y),
            format!("{:02}.{:02}.{:02}", d, m, y % 100),
            format!("{}. {}. {}", d, m, y),
            FieldTransformer::format_iso(date),
        ];
        for input in &inputs {
            prop_assert_eq!(tf.parse_date(input), Some(date), "input: {}", input);
        }
    }

    #[test]
    fn prop_iso_round_trip_is_idempotent(date in date_in(1000, 2999)) {
        let tf = FieldTransformer::default();
        let iso = FieldTransformer::format_iso(date);
        let reparsed = tf.parse_date(&iso).expect("ISO 日期应可解析");
        prop_assert_eq!(FieldTransformer::format_iso(reparsed), iso);
    }

    #[test]
    fn prop_nine_digit_phone_gets_country_code(
        digits in "[0-9]{9}",
        spaced in any::<bool>(),
    ) {
        let tf = FieldTransformer::default();
        let raw = if spaced {
            format!("{} {} {}", &digits[..3], &digits[3..6], &digits[6..])
        } else {
            digits.clone()
        };

        let phone = tf.normalize_phone(&raw).expect("9 位号码应可规范化");
        prop_assert!(phone.starts_with("+420 "));
        prop_assert_eq!(phone.chars().filter(|c| c.is_ascii_digit()).count(), 12);
        prop_assert_eq!(tf.normalize_phone(&phone), Some(phone.clone()));
    }

    #[test]
    fn prop_unmapped_required_field_errors_once_per_row(
        totals in prop::collection::vec("[1-9][0-9]{0,5}", 1..20),
    ) {
        let cells: Vec<Vec<&str>> = totals.iter().map(|t| vec!["x", t.as_str()]).collect();
        let cell_refs: Vec<&[&str]> = cells.iter().map(|r| r.as_slice()).collect();
        let rows = raw_rows(&["Poznámka", "Celkem"], &cell_refs);
        let mapping = mapping(&[("Celkem", "total")]);

        let tf = FieldTransformer::default();
        let outcome = Validator::new(mapper_for(EntityType::Invoice), &tf).validate(&rows, &mapping);

        prop_assert_eq!(outcome.errors.len(), rows.len());
        prop_assert!(outcome.errors.iter().all(|e| e.field == "invoice_number"));
        prop_assert_eq!(outcome.mapping_errors.len(), 1);
        prop_assert!(!outcome.can_import);
        prop_assert!(!outcome.can_import_with_skip);
    }

    #[test]
    fn prop_valid_and_invalid_rows_partition_batch(
        rows in prop::collection::vec(("[A-Z0-9]{0,6}", "[0-9a-z ,]{0,7}"), 0..25),
    ) {
        let cells: Vec<Vec<&str>> = rows
            .iter()
            .map(|(number, total)| vec![number.as_str(), total.as_str()])
            .collect();
        let cell_refs: Vec<&[&str]> = cells.iter().map(|r| r.as_slice()).collect();
        let raw = raw_rows(&["Číslo faktury", "Celkem"], &cell_refs);
        let mapping = mapping(&[("Číslo faktury", "invoice_number"), ("Celkem", "total")]);

        let tf = FieldTransformer::default();
        let outcome = Validator::new(mapper_for(EntityType::Invoice), &tf).validate(&raw, &mapping);

        let mut all: Vec<usize> = outcome
            .valid_rows
            .iter()
            .chain(outcome.invalid_rows.iter())
            .copied()
            .collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..raw.len()).collect::<Vec<_>>());
        prop_assert!(outcome.warning_rows.iter().all(|r| outcome.valid_rows.contains(r)));
        prop_assert_eq!(outcome.total_rows, raw.len());
        prop_assert_eq!(outcome.can_import, outcome.invalid_rows.is_empty());
    }
}
