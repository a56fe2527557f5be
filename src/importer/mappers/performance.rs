// ==========================================
// 业务管理套件 - 演出节目映射器
// ==========================================
// 自然键: slug（由标题生成）
// ==========================================

use crate::domain::{
    EntityType, MappedRecord, MappedRow, Performance, Severity, TargetFieldDescriptor as F,
};
use crate::importer::mappers::{text, Dictionary, EntityMapper, Heuristics, ProjectionContext};
use crate::importer::rules::{check_bool, ordered_pair, FieldKind, FieldRule, RowRule, RuleSet};
use crate::importer::transformers::FieldTransformer;

const CATALOG: &[F] = &[
    F::required("title", "Název představení"),
    F::optional("description", "Popis"),
    F::optional("duration", "Délka"),
    F::optional("price", "Cena"),
    F::optional("age_from", "Věk od"),
    F::optional("age_to", "Věk do"),
    F::optional("max_children", "Max. počet dětí"),
    F::optional("category", "Kategorie"),
    F::optional("is_active", "Aktivní"),
];

const DICTIONARY: Dictionary = &[
    ("Název", "title"),
    ("Název představení", "title"),
    ("Představení", "title"),
    ("Popis", "description"),
    ("Délka", "duration"),
    ("Délka (min)", "duration"),
    ("Cena", "price"),
    ("Věk od", "age_from"),
    ("Věk do", "age_to"),
    ("Max. dětí", "max_children"),
    ("Kapacita", "max_children"),
    ("Kategorie", "category"),
    ("Aktivní", "is_active"),
];

const HEURISTICS: Heuristics = &[
    ("popis", "description"),
    ("délk", "duration"),
    ("trvání", "duration"),
    ("cena", "price"),
    ("věk od", "age_from"),
    ("věk do", "age_to"),
    ("kapacit", "max_children"),
    ("dět", "max_children"),
    ("kategor", "category"),
    ("aktiv", "is_active"),
    ("název", "title"),
    ("title", "title"),
];

pub struct PerformanceMapper;

impl EntityMapper for PerformanceMapper {
    fn entity_type(&self) -> EntityType {
        EntityType::Performance
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
            FieldRule::new("title", FieldKind::Title).required().length(2, 200),
            FieldRule::new("duration", FieldKind::Duration),
            FieldRule::new("price", FieldKind::Money).min(0.0),
            FieldRule::new("age_from", FieldKind::Number).range(0.0, 99.0),
            FieldRule::new("age_to", FieldKind::Number).range(0.0, 99.0),
            FieldRule::new("max_children", FieldKind::Number).min(1.0),
            FieldRule::new("is_active", FieldKind::Text).custom(check_bool),
        ])
        .unique(&["title"])
        .row_rule(RowRule::new(
            "age_to",
            Severity::Warning,
            "validation.age_range",
            |row, tf| ordered_pair(row, tf, "age_from", "age_to"),
        ))
    }

    fn project(
        &self,
        row: &MappedRow,
        _row_index: usize,
        ctx: &ProjectionContext<'_>,
    ) -> Option<MappedRecord> {
        let title = text(row, "title")?;
        let slug = FieldTransformer::slugify(&title);
        if slug.is_empty() {
            return None;
        }
        let tf = ctx.transformer;

        Some(MappedRecord::Performance(Performance {
            title,
            slug,
            description: text(row, "description")
                .map(|v| FieldTransformer::rich_text_blocks(&v))
                .unwrap_or_default(),
            duration_minutes: text(row, "duration")
                .and_then(|v| FieldTransformer::parse_duration(&v)),
            price: text(row, "price").and_then(|v| tf.parse_money(&v)),
            age_from: text(row, "age_from").and_then(|v| tf.parse_count(&v)),
            age_to: text(row, "age_to").and_then(|v| tf.parse_count(&v)),
            max_children: text(row, "max_children").and_then(|v| tf.parse_count(&v)),
            category: text(row, "category"),
            is_active: text(row, "is_active")
                .and_then(|v| FieldTransformer::parse_bool(&v))
                .unwrap_or(true),
        }))
    }
}
