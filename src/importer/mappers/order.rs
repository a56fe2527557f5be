// ==========================================
// 业务管理套件 - 订单映射器
// ==========================================
// 自然键: booking_key（活动日期 + 客户名 + 地点，跨文件稳定）
// 参考号: order_number（源文件无订单号，按 {活动年份}-{序号:04} 合成，仅在文件内唯一）
// 硬性字段: 活动日期、客户名称
// ==========================================

use crate::domain::{EntityType, MappedRecord, MappedRow, Order, TargetFieldDescriptor as F};
use crate::importer::mappers::{text, Dictionary, EntityMapper, Heuristics, ProjectionContext};
use crate::importer::rules::{FieldKind, FieldRule, RuleSet};
use crate::importer::transformers::FieldTransformer;
use chrono::{Datelike, NaiveDate};

const CATALOG: &[F] = &[
    F::required("event_date", "Datum akce"),
    F::required("customer_name", "Zákazník"),
    F::optional("customer_email", "E-mail"),
    F::optional("customer_phone", "Telefon"),
    F::optional("venue", "Místo konání"),
    F::optional("gps", "GPS"),
    F::optional("package", "Balíček"),
    F::optional("price", "Cena"),
    F::optional("duration", "Délka"),
    F::optional("children_count", "Počet dětí"),
    F::optional("note", "Poznámka"),
];

const DICTIONARY: Dictionary = &[
    ("Datum akce", "event_date"),
    ("Datum", "event_date"),
    ("Termín", "event_date"),
    ("Zákazník", "customer_name"),
    ("Objednatel", "customer_name"),
    ("Jméno", "customer_name"),
    ("E-mail", "customer_email"),
    ("Email", "customer_email"),
    ("Telefon", "customer_phone"),
    ("Místo", "venue"),
    ("Místo konání", "venue"),
    ("Adresa", "venue"),
    ("GPS", "gps"),
    ("Souřadnice", "gps"),
    ("Balíček", "package"),
    ("Program", "package"),
    ("Cena", "price"),
    ("Délka", "duration"),
    ("Délka programu", "duration"),
    ("Počet dětí", "children_count"),
    ("Poznámka", "note"),
];

const HEURISTICS: Heuristics = &[
    ("gps", "gps"),
    ("souřad", "gps"),
    ("mail", "customer_email"),
    ("tel", "customer_phone"),
    ("dět", "children_count"),
    ("datum", "event_date"),
    ("termín", "event_date"),
    ("místo", "venue"),
    ("adres", "venue"),
    ("balíč", "package"),
    ("program", "package"),
    ("cena", "price"),
    ("částk", "price"),
    ("délk", "duration"),
    ("trvání", "duration"),
    ("zákazn", "customer_name"),
    ("objednat", "customer_name"),
    ("jméno", "customer_name"),
    ("pozn", "note"),
];

pub struct OrderMapper;

impl OrderMapper {
    /// 合成订单号: 活动年份 + 1 基序号
    pub fn order_number(year: i32, row_index: usize) -> String {
        format!("{}-{:04}", year, row_index + 1)
    }

    /// 预订键: 同一天、同一客户、同一地点视为同一订单
    pub fn booking_key(event_date: NaiveDate, customer_name: &str, venue: Option<&str>) -> String {
        format!(
            "{}/{}/{}",
            FieldTransformer::format_iso(event_date),
            FieldTransformer::slugify(customer_name),
            venue.map(FieldTransformer::slugify).unwrap_or_default()
        )
    }
}

impl EntityMapper for OrderMapper {
    fn entity_type(&self) -> EntityType {
        EntityType::Order
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
            FieldRule::new("event_date", FieldKind::Date).required(),
            FieldRule::new("customer_name", FieldKind::Text)
                .required()
                .max_len(200),
            FieldRule::new("customer_email", FieldKind::Email),
            FieldRule::new("customer_phone", FieldKind::Phone),
            FieldRule::new("gps", FieldKind::Gps),
            FieldRule::new("price", FieldKind::Money).min(0.0),
            FieldRule::new("duration", FieldKind::Duration),
            FieldRule::new("children_count", FieldKind::Number).range(0.0, 500.0),
        ])
    }

    fn project(
        &self,
        row: &MappedRow,
        row_index: usize,
        ctx: &ProjectionContext<'_>,
    ) -> Option<MappedRecord> {
        let tf = ctx.transformer;
        let event_date = text(row, "event_date").and_then(|v| tf.parse_date(&v))?;
        let customer_name = text(row, "customer_name")?;
        let venue = text(row, "venue");

        Some(MappedRecord::Order(Order {
            order_number: Self::order_number(event_date.year(), row_index),
            booking_key: Self::booking_key(event_date, &customer_name, venue.as_deref()),
            event_date,
            customer_name,
            customer_email: text(row, "customer_email")
                .and_then(|v| FieldTransformer::normalize_email(&v)),
            customer_phone: text(row, "customer_phone").and_then(|v| tf.normalize_phone(&v)),
            venue,
            gps: text(row, "gps").and_then(|v| FieldTransformer::parse_gps(&v)),
            package: text(row, "package"),
            price: text(row, "price").and_then(|v| tf.parse_money(&v)),
            duration_minutes: text(row, "duration")
                .and_then(|v| FieldTransformer::parse_duration(&v)),
            children_count: text(row, "children_count").and_then(|v| tf.parse_count(&v)),
            note: text(row, "note"),
        }))
    }
}
