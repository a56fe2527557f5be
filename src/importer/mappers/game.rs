// ==========================================
// 业务管理套件 - 儿童游戏映射器
// ==========================================
// 自然键: slug（由标题生成）
// ==========================================

use crate::domain::{EntityType, Game, MappedRecord, MappedRow, Severity, TargetFieldDescriptor as F};
use crate::importer::mappers::{text, Dictionary, EntityMapper, Heuristics, ProjectionContext};
use crate::importer::rules::{ordered_pair, FieldKind, FieldRule, RowRule, RuleSet};
use crate::importer::transformers::FieldTransformer;

const CATALOG: &[F] = &[
    F::required("title", "Název hry"),
    F::optional("description", "Popis"),
    F::optional("rules", "Pravidla"),
    F::optional("min_players", "Min. hráčů"),
    F::optional("max_players", "Max. hráčů"),
    F::optional("age_from", "Věk od"),
    F::optional("duration", "Délka"),
    F::optional("category", "Kategorie"),
    F::optional("equipment", "Pomůcky"),
];

const DICTIONARY: Dictionary = &[
    ("Název", "title"),
    ("Název hry", "title"),
    ("Hra", "title"),
    ("Popis", "description"),
    ("Pravidla", "rules"),
    ("Min. hráčů", "min_players"),
    ("Max. hráčů", "max_players"),
    ("Věk od", "age_from"),
    ("Délka", "duration"),
    ("Kategorie", "category"),
    ("Pomůcky", "equipment"),
];

const HEURISTICS: Heuristics = &[
    ("pravid", "rules"),
    ("popis", "description"),
    ("min", "min_players"),
    ("max", "max_players"),
    ("věk", "age_from"),
    ("délk", "duration"),
    ("trvání", "duration"),
    ("kategor", "category"),
    ("pomůc", "equipment"),
    ("vybav", "equipment"),
    ("název", "title"),
    ("hra", "title"),
];

pub struct GameMapper;

impl EntityMapper for GameMapper {
    fn entity_type(&self) -> EntityType {
        EntityType::Game
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
            FieldRule::new("min_players", FieldKind::Number).min(1.0),
            FieldRule::new("max_players", FieldKind::Number).min(1.0),
            FieldRule::new("age_from", FieldKind::Number).range(0.0, 99.0),
            FieldRule::new("duration", FieldKind::Duration),
        ])
        .unique(&["title"])
        .row_rule(RowRule::new(
            "max_players",
            Severity::Warning,
            "validation.players_range",
            |row, tf| ordered_pair(row, tf, "min_players", "max_players"),
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
        let blocks = |field: &str| {
            text(row, field)
                .map(|v| FieldTransformer::rich_text_blocks(&v))
                .unwrap_or_default()
        };

        Some(MappedRecord::Game(Game {
            title,
            slug,
            description: blocks("description"),
            rules: blocks("rules"),
            min_players: text(row, "min_players").and_then(|v| tf.parse_count(&v)),
            max_players: text(row, "max_players").and_then(|v| tf.parse_count(&v)),
            age_from: text(row, "age_from").and_then(|v| tf.parse_count(&v)),
            duration_minutes: text(row, "duration")
                .and_then(|v| FieldTransformer::parse_duration(&v)),
            category: text(row, "category"),
            equipment: text(row, "equipment"),
        }))
    }
}
