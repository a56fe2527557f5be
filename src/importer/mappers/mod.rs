// ==========================================
// 业务管理套件 - 实体映射器
// ==========================================
// 职责: 每个目标实体一个映射器
//   - 目标字段目录（含通用 _skip 伪字段）
//   - 默认源列名字典（声明式数据表）
//   - 列映射建议（评分函数）
//   - 行 → 实体投影
//   - 校验规则集
// ==========================================

pub mod customer_company;
pub mod customer_person;
pub mod game;
pub mod invoice;
pub mod order;
pub mod performance;

pub use customer_company::CustomerCompanyMapper;
pub use customer_person::CustomerPersonMapper;
pub use game::GameMapper;
pub use invoice::InvoiceMapper;
pub use order::OrderMapper;
pub use performance::PerformanceMapper;

use crate::domain::{
    ColumnMapping, EntityType, MappedRecord, MappedRow, MappingIssue, MappingIssueKind,
    TargetFieldDescriptor, SKIP_DESCRIPTOR, SKIP_FIELD,
};
use crate::i18n::t_with_args;
use crate::importer::clock::Clock;
use crate::importer::rules::RuleSet;
use crate::importer::transformers::FieldTransformer;
use std::collections::{BTreeMap, HashSet};

/// 源列名 → 目标字段
pub type Dictionary = &'static [(&'static str, &'static str)];

/// 表头子串（小写）→ 目标字段，按优先级排列
pub type Heuristics = &'static [(&'static str, &'static str)];

// 建议评分
const SCORE_EXACT: u8 = 3;
const SCORE_CASE_INSENSITIVE: u8 = 2;
const SCORE_HEURISTIC: u8 = 1;

// ==========================================
// ProjectionContext - 投影所需能力
// ==========================================
pub struct ProjectionContext<'a> {
    pub transformer: &'a FieldTransformer,
    pub clock: &'a dyn Clock,
}

// ==========================================
// EntityMapper Trait
// ==========================================
pub trait EntityMapper: Send + Sync {
    fn entity_type(&self) -> EntityType;

    /// 目标字段目录（不含 _skip）
    fn catalog(&self) -> &'static [TargetFieldDescriptor];

    /// 默认源列名字典
    fn dictionary(&self) -> Dictionary;

    /// 子串启发式
    fn heuristics(&self) -> Heuristics;

    /// 校验规则集
    fn rules(&self) -> RuleSet;

    /// 行 → 实体；硬性自然键缺失时返回 None
    fn project(
        &self,
        row: &MappedRow,
        row_index: usize,
        ctx: &ProjectionContext<'_>,
    ) -> Option<MappedRecord>;

    /// 目标字段（含 _skip）
    fn target_fields(&self) -> Vec<TargetFieldDescriptor> {
        let mut fields = self.catalog().to_vec();
        fields.push(SKIP_DESCRIPTOR);
        fields
    }

    fn required_fields(&self) -> Vec<&'static str> {
        self.catalog()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.id)
            .collect()
    }

    fn descriptor(&self, field: &str) -> Option<&'static TargetFieldDescriptor> {
        self.catalog().iter().find(|f| f.id == field)
    }

    fn suggest(&self, headers: &[String]) -> ColumnMapping {
        suggest_mapping(self.dictionary(), self.heuristics(), headers)
    }
}

/// 按实体类型取映射器
pub fn mapper_for(entity: EntityType) -> &'static dyn EntityMapper {
    match entity {
        EntityType::CustomerCompany => &CustomerCompanyMapper,
        EntityType::CustomerPerson => &CustomerPersonMapper,
        EntityType::Invoice => &InvoiceMapper,
        EntityType::Order => &OrderMapper,
        EntityType::Performance => &PerformanceMapper,
        EntityType::Game => &GameMapper,
    }
}

// ==========================================
// 映射建议
// ==========================================

/// 单个表头的最佳候选（得分, 目标字段）
fn score_header(
    dictionary: Dictionary,
    heuristics: Heuristics,
    header: &str,
) -> Option<(u8, &'static str)> {
    let header = header.trim();
    if header.is_empty() {
        return None;
    }

    if let Some((_, target)) = dictionary.iter().find(|(name, _)| *name == header) {
        return Some((SCORE_EXACT, *target));
    }

    let lower = header.to_lowercase();
    if let Some((_, target)) = dictionary
        .iter()
        .find(|(name, _)| name.to_lowercase() == lower)
    {
        return Some((SCORE_CASE_INSENSITIVE, *target));
    }

    heuristics
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, target)| (SCORE_HEURISTIC, *target))
}

/// 生成建议映射
///
/// # 算法
/// 1. 每个表头取最佳候选（精确 3 > 忽略大小写 2 > 子串 1）
/// 2. 按 (得分降序, 表头顺序升序) 贪心分配，每个目标字段至多分配一次
/// 3. 无候选的表头不出现在结果中
pub fn suggest_mapping(
    dictionary: Dictionary,
    heuristics: Heuristics,
    headers: &[String],
) -> ColumnMapping {
    let mut candidates: Vec<(u8, usize, &str, &'static str)> = headers
        .iter()
        .enumerate()
        .filter_map(|(order, header)| {
            score_header(dictionary, heuristics, header)
                .map(|(score, target)| (score, order, header.as_str(), target))
        })
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut taken: HashSet<&'static str> = HashSet::new();
    let mut mapping = ColumnMapping::new();
    for (_, _, header, target) in candidates {
        if target != SKIP_FIELD && !taken.insert(target) {
            continue;
        }
        mapping.insert(header, target);
    }

    mapping
}

// ==========================================
// 映射检查
// ==========================================

/// 检查映射: 必填未映射、目标重复映射、未知目标字段
pub fn check_mapping(mapping: &ColumnMapping, mapper: &dyn EntityMapper) -> Vec<MappingIssue> {
    let mut issues = Vec::new();

    let mut by_target: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (source, target) in mapping.active() {
        by_target.entry(target).or_default().push(source.to_string());
    }

    for (target, sources) in &by_target {
        if mapper.descriptor(target).is_none() {
            issues.push(MappingIssue {
                kind: MappingIssueKind::UnknownTargetField,
                field: target.to_string(),
                sources: sources.clone(),
                message: t_with_args("mapping.unknown_target", &[("field", *target)]),
            });
        } else if sources.len() > 1 {
            issues.push(MappingIssue {
                kind: MappingIssueKind::DuplicateTargetMapping,
                field: target.to_string(),
                sources: sources.clone(),
                message: t_with_args(
                    "mapping.duplicate_target",
                    &[
                        ("field", field_label(mapper, target)),
                        ("sources", sources.join(", ").as_str()),
                    ],
                ),
            });
        }
    }

    for field in mapper.catalog().iter().filter(|f| f.required) {
        if !by_target.contains_key(field.id) {
            issues.push(MappingIssue {
                kind: MappingIssueKind::RequiredFieldUnmapped,
                field: field.id.to_string(),
                sources: Vec::new(),
                message: t_with_args("mapping.required_unmapped", &[("field", field.label)]),
            });
        }
    }

    issues
}

/// 字段显示名（未知字段退回 ID）
pub fn field_label<'a>(mapper: &dyn EntityMapper, field: &'a str) -> &'a str {
    mapper.descriptor(field).map(|d| d.label).unwrap_or(field)
}

// ==========================================
// 投影工具
// ==========================================

/// 取非空去空白值
pub(crate) fn text(row: &MappedRow, field: &str) -> Option<String> {
    row.get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
