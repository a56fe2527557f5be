// ==========================================
// 业务管理套件 - 发票映射器
// ==========================================
// 自然键: invoice_number
// 派生: 已有支付日期或到期日已过 → Paid（历史导入按已结清处理）
// ==========================================

use crate::domain::{
    EntityType, Invoice, InvoiceStatus, MappedRecord, MappedRow, TargetFieldDescriptor as F,
    SKIP_FIELD,
};
use crate::importer::mappers::{text, Dictionary, EntityMapper, Heuristics, ProjectionContext};
use crate::importer::patterns::VARIABLE_SYMBOL;
use crate::importer::rules::{check_currency, FieldKind, FieldRule, RuleSet};
use crate::importer::transformers::FieldTransformer;

pub const DEFAULT_CURRENCY: &str = "CZK";

const CATALOG: &[F] = &[
    F::required("invoice_number", "Číslo faktury"),
    F::optional("issue_date", "Datum vystavení"),
    F::optional("due_date", "Datum splatnosti"),
    F::optional("paid_date", "Datum úhrady"),
    F::optional("customer_name", "Odběratel"),
    F::optional("customer_ico", "IČO odběratele"),
    F::required("total", "Částka celkem"),
    F::optional("currency", "Měna"),
    F::optional("vat_rate", "Sazba DPH"),
    F::optional("variable_symbol", "Variabilní symbol"),
    F::optional("note", "Poznámka"),
];

const DICTIONARY: Dictionary = &[
    ("Číslo faktury", "invoice_number"),
    ("Číslo dokladu", "invoice_number"),
    ("Faktura", "invoice_number"),
    ("Datum vystavení", "issue_date"),
    ("Vystaveno", "issue_date"),
    ("Datum splatnosti", "due_date"),
    ("Splatnost", "due_date"),
    ("Datum úhrady", "paid_date"),
    ("Uhrazeno", "paid_date"),
    ("Odběratel", "customer_name"),
    ("Zákazník", "customer_name"),
    ("IČ", "customer_ico"),
    ("IČO", "customer_ico"),
    ("Částka", "total"),
    ("Celkem", "total"),
    ("Celkem s DPH", "total"),
    ("Měna", "currency"),
    ("Sazba DPH", "vat_rate"),
    ("DPH %", "vat_rate"),
    ("Variabilní symbol", "variable_symbol"),
    ("VS", "variable_symbol"),
    ("Poznámka", "note"),
];

// 顺序: "dič" 先于 "ič"；金额先于 "dph"；泛化的 "číslo"/"faktur" 最后
// （"Splatnost faktury"、"Částka faktury" 应落到日期/金额）
const HEURISTICS: Heuristics = &[
    ("dič", SKIP_FIELD),
    ("splat", "due_date"),
    ("úhrad", "paid_date"),
    ("zaplac", "paid_date"),
    ("vystav", "issue_date"),
    ("datum", "issue_date"),
    ("ičo", "customer_ico"),
    ("ič", "customer_ico"),
    ("odběr", "customer_name"),
    ("zákazn", "customer_name"),
    ("celk", "total"),
    ("částk", "total"),
    ("total", "total"),
    ("amount", "total"),
    ("dph", "vat_rate"),
    ("vat", "vat_rate"),
    ("měna", "currency"),
    ("curr", "currency"),
    ("variab", "variable_symbol"),
    ("pozn", "note"),
    ("číslo", "invoice_number"),
    ("faktur", "invoice_number"),
];

pub struct InvoiceMapper;

impl EntityMapper for InvoiceMapper {
    fn entity_type(&self) -> EntityType {
        EntityType::Invoice
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
            FieldRule::new("invoice_number", FieldKind::Text)
                .required()
                .max_len(50),
            FieldRule::new("total", FieldKind::Money).required(),
            FieldRule::new("issue_date", FieldKind::Date),
            FieldRule::new("due_date", FieldKind::Date),
            FieldRule::new("paid_date", FieldKind::Date),
            FieldRule::new("customer_ico", FieldKind::CompanyId),
            FieldRule::new("currency", FieldKind::Text).custom(check_currency),
            FieldRule::new("vat_rate", FieldKind::Number).range(0.0, 100.0),
            FieldRule::new("variable_symbol", FieldKind::Text).pattern(&VARIABLE_SYMBOL),
        ])
        .unique(&["invoice_number", "variable_symbol"])
    }

    fn project(
        &self,
        row: &MappedRow,
        _row_index: usize,
        ctx: &ProjectionContext<'_>,
    ) -> Option<MappedRecord> {
        let invoice_number = text(row, "invoice_number")?;
        let tf = ctx.transformer;

        let date = |field: &str| text(row, field).and_then(|v| tf.parse_date(&v));
        let issue_date = date("issue_date");
        let due_date = date("due_date");
        let paid_date = date("paid_date");

        let settled = paid_date.is_some() || due_date.is_some_and(|due| due < ctx.clock.today());
        let status = if settled {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Issued
        };

        Some(MappedRecord::Invoice(Invoice {
            invoice_number,
            issue_date,
            due_date,
            paid_date,
            customer_name: text(row, "customer_name"),
            customer_ico: text(row, "customer_ico").and_then(|v| FieldTransformer::normalize_ico(&v)),
            total: text(row, "total").and_then(|v| tf.parse_money(&v)),
            currency: text(row, "currency")
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            vat_rate: text(row, "vat_rate").and_then(|v| tf.parse_number(&v)),
            variable_symbol: text(row, "variable_symbol"),
            status,
            note: text(row, "note"),
        }))
    }
}
