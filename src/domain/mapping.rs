// ==========================================
// 业务管理套件 - 列映射模型
// ==========================================
// 用途: 源列 → 目标字段映射与目标字段描述
// ==========================================

use crate::domain::table::RawRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 伪字段: 忽略该源列
pub const SKIP_FIELD: &str = "_skip";

/// 映射后行（目标字段 → 去首尾空白后的值）
pub type MappedRow = HashMap<String, String>;

// ==========================================
// TargetFieldDescriptor - 目标字段描述
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFieldDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub required: bool,
}

impl TargetFieldDescriptor {
    pub const fn required(id: &'static str, label: &'static str) -> Self {
        Self { id, label, required: true }
    }

    pub const fn optional(id: &'static str, label: &'static str) -> Self {
        Self { id, label, required: false }
    }
}

/// 通用伪字段描述
pub const SKIP_DESCRIPTOR: TargetFieldDescriptor =
    TargetFieldDescriptor::optional(SKIP_FIELD, "Nepoužívat");

// ==========================================
// ColumnMapping - 源列 → 目标字段
// ==========================================
// 使用 BTreeMap 保证迭代顺序确定（按源列名排序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<String, String>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.0.insert(source.into(), target.into());
    }

    pub fn target_of(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    /// 是否有源列映射到该目标字段
    pub fn is_mapped(&self, target: &str) -> bool {
        self.0.values().any(|t| t == target)
    }

    /// 映射到该目标字段的所有源列（按源列名排序）
    pub fn sources_for(&self, target: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, t)| t.as_str() == target)
            .map(|(s, _)| s.as_str())
            .collect()
    }

    /// 有效映射（排除 `_skip`）
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, t)| t.as_str() != SKIP_FIELD && !t.is_empty())
            .map(|(s, t)| (s.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 将原始行投影为目标字段行
    ///
    /// # 说明
    /// - 多个源列映射到同一目标字段时，取按源列名排序的第一个非空值
    ///   （校验阶段会单独报告 duplicate_target_mapping 错误）
    pub fn apply(&self, row: &RawRow) -> MappedRow {
        let mut mapped = MappedRow::new();
        for (source, target) in self.active() {
            let value = row.get(source).map(|v| v.trim()).unwrap_or("");
            match mapped.get(target) {
                Some(existing) if !existing.is_empty() => {}
                _ => {
                    mapped.insert(target.to_string(), value.to_string());
                }
            }
        }
        mapped
    }
}

impl FromIterator<(String, String)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_apply_trims_and_skips() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("IČ", "ico");
        mapping.insert("Poznámka", SKIP_FIELD);

        let mapped = mapping.apply(&row(&[("IČ", " 12345678 "), ("Poznámka", "x")]));

        assert_eq!(mapped.get("ico"), Some(&"12345678".to_string()));
        assert!(!mapped.contains_key(SKIP_FIELD));
    }

    #[test]
    fn test_apply_conflicting_targets_is_deterministic() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("B", "name");
        mapping.insert("A", "name");

        let mapped = mapping.apply(&row(&[("A", "first"), ("B", "second")]));

        assert_eq!(mapped.get("name"), Some(&"first".to_string()));
        assert_eq!(mapping.sources_for("name"), vec!["A", "B"]);
    }

    #[test]
    fn test_missing_source_column_maps_to_empty() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("Email", "email");

        let mapped = mapping.apply(&row(&[]));

        assert_eq!(mapped.get("email"), Some(&String::new()));
    }
}
