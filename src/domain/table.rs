// ==========================================
// 业务管理套件 - 解析表格模型
// ==========================================
// 用途: TableParser 输出，导入管道第一阶段产物
// 生命周期: 仅在单次导入调用内
// ==========================================

use crate::domain::types::InferredType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 原始行记录（列名 → 原始字符串值）
pub type RawRow = HashMap<String, String>;

// ==========================================
// ParsedTable - 解析后的表格
// ==========================================
// 不变量: 每一行对每个声明列都有值（可能为空字符串）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub headers: Vec<String>,               // 列名（唯一，保持原顺序）
    pub rows: Vec<RawRow>,                  // 数据行
    pub row_count: usize,                   // 数据行数
    pub diagnostics: Vec<ParseDiagnostic>,  // 解析诊断
    pub delimiter: char,                    // 识别出的分隔符
    pub encoding: String,                   // 识别出的编码名称
    pub truncated: bool,                    // 是否因行数上限被截断
}

impl ParsedTable {
    /// 前 N 行预览
    pub fn preview(&self, limit: usize) -> Vec<RawRow> {
        self.rows.iter().take(limit).cloned().collect()
    }
}

// ==========================================
// ParseDiagnostic - 解析诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDiagnostic {
    pub line: u64,       // 源文件行号（从 1 开始）
    pub message: String, // 诊断描述
}

// ==========================================
// ColumnStats - 列统计（仅诊断展示，不影响控制流）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub column: String,
    pub non_empty_count: usize,
    pub distinct_count: usize,
    pub samples: Vec<String>,         // 最多 5 个样例值
    pub inferred_type: InferredType,
}
