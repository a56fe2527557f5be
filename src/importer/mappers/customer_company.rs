// ==========================================
// 业务管理套件 - 客户（公司）映射器
// ==========================================
// 自然键: ico
// 派生: 缺失邮箱时按 IČO 生成稳定占位邮箱
// ==========================================

use crate::domain::{
    CustomerCompany, EntityType, MappedRecord, MappedRow, TargetFieldDescriptor as F,
};
use crate::importer::mappers::{text, Dictionary, EntityMapper, Heuristics, ProjectionContext};
use crate::importer::patterns::ZIP;
use crate::importer::rules::{FieldKind, FieldRule, RuleSet};
use crate::importer::transformers::FieldTransformer;

const CATALOG: &[F] = &[
    F::required("name", "Název firmy"),
    F::optional("ico", "IČO"),
    F::optional("dic", "DIČ"),
    F::optional("email", "E-mail"),
    F::optional("phone", "Telefon"),
    F::optional("street", "Ulice"),
    F::optional("city", "Město"),
    F::optional("zip", "PSČ"),
    F::optional("country", "Stát"),
    F::optional("contact_person", "Kontaktní osoba"),
    F::optional("website", "Web"),
    F::optional("note", "Poznámka"),
];

const DICTIONARY: Dictionary = &[
    ("Název", "name"),
    ("Název firmy", "name"),
    ("Firma", "name"),
    ("Společnost", "name"),
    ("Obchodní jméno", "name"),
    ("IČ", "ico"),
    ("IČO", "ico"),
    ("DIČ", "dic"),
    ("E-mail", "email"),
    ("Email", "email"),
    ("Telefon", "phone"),
    ("Tel.", "phone"),
    ("Ulice", "street"),
    ("Adresa", "street"),
    ("Město", "city"),
    ("Obec", "city"),
    ("PSČ", "zip"),
    ("Stát", "country"),
    ("Země", "country"),
    ("Kontaktní osoba", "contact_person"),
    ("Web", "website"),
    ("WWW", "website"),
    ("Poznámka", "note"),
];

// "dič" 必须先于 "ič"
const HEURISTICS: Heuristics = &[
    ("dič", "dic"),
    ("vat", "dic"),
    ("ičo", "ico"),
    ("ič", "ico"),
    ("mail", "email"),
    ("tel", "phone"),
    ("mobil", "phone"),
    ("psč", "zip"),
    ("zip", "zip"),
    ("ulice", "street"),
    ("adres", "street"),
    ("měst", "city"),
    ("city", "city"),
    ("kontakt", "contact_person"),
    ("web", "website"),
    ("www", "website"),
    ("pozn", "note"),
    ("firm", "name"),
    ("název", "name"),
    ("company", "name"),
];

pub struct CustomerCompanyMapper;

impl EntityMapper for CustomerCompanyMapper {
    fn entity_type(&self) -> EntityType {
        EntityType::CustomerCompany
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
            FieldRule::new("name", FieldKind::Text).required().max_len(255),
            FieldRule::new("ico", FieldKind::CompanyId),
            FieldRule::new("dic", FieldKind::VatId),
            FieldRule::new("email", FieldKind::Email),
            FieldRule::new("phone", FieldKind::Phone),
            FieldRule::new("zip", FieldKind::Text).pattern(&ZIP),
            FieldRule::new("website", FieldKind::Url),
        ])
        .unique(&["ico", "dic", "email"])
    }

    fn project(
        &self,
        row: &MappedRow,
        row_index: usize,
        ctx: &ProjectionContext<'_>,
    ) -> Option<MappedRecord> {
        let name = text(row, "name")?;
        let tf = ctx.transformer;

        let ico = text(row, "ico").and_then(|v| FieldTransformer::normalize_ico(&v));
        let (email, email_is_placeholder) =
            match text(row, "email").and_then(|v| FieldTransformer::normalize_email(&v)) {
                Some(email) => (email, false),
                None => (
                    FieldTransformer::placeholder_email(ico.as_deref(), row_index, ctx.clock),
                    true,
                ),
            };

        Some(MappedRecord::CustomerCompany(CustomerCompany {
            name,
            dic: text(row, "dic").and_then(|v| tf.normalize_dic(&v)),
            ico,
            email,
            email_is_placeholder,
            phone: text(row, "phone").and_then(|v| tf.normalize_phone(&v)),
            street: text(row, "street"),
            city: text(row, "city"),
            zip: text(row, "zip"),
            country: text(row, "country"),
            contact_person: text(row, "contact_person"),
            website: text(row, "website"),
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

    fn project(row: &MappedRow) -> Option<MappedRecord> {
        let tf = FieldTransformer::default();
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 42);
        let ctx = ProjectionContext {
            transformer: &tf,
            clock: &clock,
        };
        CustomerCompanyMapper.project(row, 0, &ctx)
    }

    #[test]
    fn test_exact_header_ic_maps_to_ico() {
        let mapping = CustomerCompanyMapper.suggest(&["IČ".to_string(), "Název".to_string()]);
        assert_eq!(mapping.target_of("IČ"), Some("ico"));
        assert_eq!(mapping.target_of("Název"), Some("name"));
    }

    #[test]
    fn test_project_normalizes_and_uses_stable_placeholder() {
        let record = project(&row(&[
            ("name", "Alfa s.r.o."),
            ("ico", "2345678"),
            ("dic", "cz02345678"),
            ("phone", "777123456"),
            ("email", ""),
        ]))
        .unwrap();

        let MappedRecord::CustomerCompany(company) = record else {
            panic!("unexpected entity");
        };
        assert_eq!(company.ico.as_deref(), Some("02345678"));
        assert_eq!(company.dic.as_deref(), Some("CZ02345678"));
        assert_eq!(company.phone.as_deref(), Some("+420 777 123 456"));
        assert_eq!(company.email, "import-02345678@noemail.invalid");
        assert!(company.email_is_placeholder);
    }

    #[test]
    fn test_missing_name_produces_no_record() {
        assert!(project(&row(&[("name", "  "), ("ico", "12345678")])).is_none());
    }
}
