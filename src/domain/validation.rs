// ==========================================
// 业务管理套件 - 校验结果模型
// ==========================================
// 用途: 字段问题、映射问题、批内重复与已存在冲突
// ==========================================

use crate::domain::types::{RowStatus, Severity};
use serde::{Deserialize, Serialize};

// ==========================================
// FieldIssue - 字段级问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub row_index: usize,   // 0 基行号
    pub field: String,      // 目标字段 ID
    pub value: String,      // 原始值
    pub message: String,    // 本地化描述
    pub severity: Severity,
}

// ==========================================
// MappingIssue - 映射阶段问题
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingIssueKind {
    RequiredFieldUnmapped,  // 必填目标字段未映射
    DuplicateTargetMapping, // 多个源列映射到同一目标字段
    UnknownTargetField,     // 目标字段不在实体目录中
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingIssue {
    pub kind: MappingIssueKind,
    pub field: String,
    pub sources: Vec<String>,
    pub message: String,
}

// ==========================================
// 批次级事实
// ==========================================

/// 同批次重复组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub field: String,
    pub value: String,
    pub rows: Vec<usize>,
}

/// 已存在记录命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingMatch {
    pub row_index: usize,
    pub field: String,
    pub value: String,
    pub existing_id: String,
}

// ==========================================
// ValidationOutcome - 校验结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub total_rows: usize,
    pub row_statuses: Vec<RowStatus>,
    pub valid_rows: Vec<usize>,     // 无错误的行（含仅有警告的行）
    pub invalid_rows: Vec<usize>,   // 有错误的行
    pub warning_rows: Vec<usize>,   // 无错误但有警告的行
    pub errors: Vec<FieldIssue>,
    pub warnings: Vec<FieldIssue>,
    pub mapping_errors: Vec<MappingIssue>,
    pub duplicates: Vec<DuplicateGroup>,
    pub existing: Vec<ExistingMatch>,
    pub can_import: bool,           // 无错误行、无映射错误、无已存在冲突
    pub can_import_with_skip: bool, // 无错误行、无映射错误（已存在冲突由执行策略处理）
}

impl ValidationOutcome {
    pub fn valid_count(&self) -> usize {
        self.valid_rows.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_rows.len()
    }

    /// 合并已存在记录检测结果并重新计算导入开关
    pub fn attach_existing(&mut self, existing: Vec<ExistingMatch>) {
        self.existing = existing;
        self.refresh_flags();
    }

    pub(crate) fn refresh_flags(&mut self) {
        let clean = self.invalid_rows.is_empty() && self.mapping_errors.is_empty();
        self.can_import_with_skip = clean;
        self.can_import = clean && self.existing.is_empty();
    }
}
