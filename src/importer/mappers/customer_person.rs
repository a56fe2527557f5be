// ==========================================
// 业务管理套件 - 客户（个人）映射器
// ==========================================
// 自然键: email（占位邮箱不作为自然键）
// 派生: 全名拆分为名/姓；单独的名/姓列优先
// ==========================================

use crate::domain::{
    CustomerPerson, EntityType, MappedRecord, MappedRow, Severity, TargetFieldDescriptor as F,
};
use crate::importer::mappers::{text, Dictionary, EntityMapper, Heuristics, ProjectionContext};
use crate::importer::patterns::ZIP;
use crate::importer::rules::{any_present, FieldKind, FieldRule, RowRule, RuleSet};
use crate::importer::transformers::FieldTransformer;

const NAME_FIELDS: &[&str] = &["first_name", "last_name", "full_name"];

const CATALOG: &[F] = &[
    F::optional("first_name", "Jméno"),
    F::optional("last_name", "Příjmení"),
    F::optional("full_name", "Jméno a příjmení"),
    F::optional("email", "E-mail"),
    F::optional("phone", "Telefon"),
    F::optional("birth_date", "Datum narození"),
    F::optional("street", "Ulice"),
    F::optional("city", "Město"),
    F::optional("zip", "PSČ"),
    F::optional("note", "Poznámka"),
];

const DICTIONARY: Dictionary = &[
    ("Jméno", "first_name"),
    ("Křestní jméno", "first_name"),
    ("Příjmení", "last_name"),
    ("Jméno a příjmení", "full_name"),
    ("Celé jméno", "full_name"),
    ("Zákazník", "full_name"),
    ("Klient", "full_name"),
    ("E-mail", "email"),
    ("Email", "email"),
    ("Telefon", "phone"),
    ("Tel.", "phone"),
    ("Mobil", "phone"),
    ("Datum narození", "birth_date"),
    ("Ulice", "street"),
    ("Adresa", "street"),
    ("Město", "city"),
    ("PSČ", "zip"),
    ("Poznámka", "note"),
];

// "příjm" 必须先于 "jméno"
const HEURISTICS: Heuristics = &[
    ("mail", "email"),
    ("tel", "phone"),
    ("mobil", "phone"),
    ("naroz", "birth_date"),
    ("birth", "birth_date"),
    ("příjm", "last_name"),
    ("surname", "last_name"),
    ("last", "last_name"),
    ("celé", "full_name"),
    ("full", "full_name"),
    ("křest", "first_name"),
    ("first", "first_name"),
    ("jméno", "first_name"),
    ("psč", "zip"),
    ("ulice", "street"),
    ("adres", "street"),
    ("měst", "city"),
    ("pozn", "note"),
];

pub struct CustomerPersonMapper;

impl EntityMapper for CustomerPersonMapper {
    fn entity_type(&self) -> EntityType {
        EntityType::CustomerPerson
    }

    fn catalog(&self) -> &'static [F] {
        CATALOG
    }

    fn dictionary(&self) -> Dictionary {
        DICTIONARY
    }

    fn heuristics(&self) -> Heuristics {
        HEURISTICS
    }

    fn rules(&self) -> RuleSet {
        RuleSet::new(vec![
            FieldRule::new("first_name", FieldKind::Text).max_len(100),
            FieldRule::new("last_name", FieldKind::Text).max_len(100),
            FieldRule::new("full_name", FieldKind::Text).max_len(200),
            FieldRule::new("email", FieldKind::Email),
            FieldRule::new("phone", FieldKind::Phone),
            FieldRule::new("birth_date", FieldKind::Date),
            FieldRule::new("zip", FieldKind::Text).pattern(&ZIP),
        ])
        .unique(&["email"])
        .row_rule(RowRule::new(
            "full_name",
            Severity::Error,
            "validation.person_name_missing",
            |row, _| any_present(row, NAME_FIELDS),
        ))
    }

    fn project(
        &self,
        row: &MappedRow,
        row_index: usize,
        ctx: &ProjectionContext<'_>,
    ) -> Option<MappedRecord> {
        let tf = ctx.transformer;

        let (split_first, split_last) = text(row, "full_name")
            .map(|full| tf.split_name(&full))
            .unwrap_or((None, None));
        let first_name = text(row, "first_name").or(split_first);
        let last_name = text(row, "last_name").or(split_last);
        if first_name.is_none() && last_name.is_none() {
            return None;
        }

        let (email, email_is_placeholder) =
            match text(row, "email").and_then(|v| FieldTransformer::normalize_email(&v)) {
                Some(email) => (email, false),
                None => (
                    FieldTransformer::placeholder_email(None, row_index, ctx.clock),
                    true,
                ),
            };

        Some(MappedRecord::CustomerPerson(CustomerPerson {
            first_name,
            last_name,
            email,
            email_is_placeholder,
            phone: text(row, "phone").and_then(|v| tf.normalize_phone(&v)),
            birth_date: text(row, "birth_date").and_then(|v| tf.parse_date(&v)),
            street: text(row, "street"),
            city: text(row, "city"),
            zip: text(row, "zip"),
            note: text(row, "note"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::clock::FixedClock;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> MappedRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn project(row: &MappedRow, row_index: usize) -> Option<MappedRecord> {
        let tf = FieldTransformer::default();
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 1000);
        let ctx = ProjectionContext {
            transformer: &tf,
            clock: &clock,
        };
        CustomerPersonMapper.project(row, row_index, &ctx)
    }

    #[test]
    fn test_full_name_split_with_reversed_order() {
        let Some(MappedRecord::CustomerPerson(person)) =
            project(&row(&[("full_name", "Nováková Jana"), ("email", "Jana@Example.cz")]), 0)
        else {
            panic!("expected person");
        };
        assert_eq!(person.first_name.as_deref(), Some("Jana"));
        assert_eq!(person.last_name.as_deref(), Some("Nováková"));
        assert_eq!(person.email, "jana@example.cz");
        assert!(!person.email_is_placeholder);
    }

    #[test]
    fn test_explicit_columns_override_split() {
        let Some(MappedRecord::CustomerPerson(person)) = project(
            &row(&[("full_name", "Jan Novák"), ("last_name", "Dvořák")]),
            0,
        ) else {
            panic!("expected person");
        };
        assert_eq!(person.first_name.as_deref(), Some("Jan"));
        assert_eq!(person.last_name.as_deref(), Some("Dvořák"));
    }

    #[test]
    fn test_time_seeded_placeholder_without_email() {
        let Some(MappedRecord::CustomerPerson(person)) =
            project(&row(&[("first_name", "Eva")]), 7)
        else {
            panic!("expected person");
        };
        assert_eq!(person.email, "import-1000-7@noemail.invalid");
        assert!(person.email_is_placeholder);
    }

    #[test]
    fn test_nameless_row_is_rejected() {
        assert!(project(&row(&[("email", "x@y.cz")]), 0).is_none());
    }
}
