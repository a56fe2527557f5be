// ==========================================
// 业务管理套件 - 导入执行结果模型
// ==========================================
// 生命周期: 每次执行新建，不落库（瞬态报告）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ImportOptions - 冲突策略与试运行开关
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    pub skip_existing: bool,   // 已存在 → 计为跳过
    pub update_existing: bool, // 已存在 → 原地更新（优先于 skip_existing）
    pub dry_run: bool,         // 试运行：只计算，不写库
}

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum RowOutcome {
    Created { id: Option<String> }, // 试运行时 id 为 None
    Updated { id: String },
    Skipped { existing_id: String },
}

// ==========================================
// RowFailure - 单行失败
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    pub row_index: usize, // 0 基行号
    pub message: String,
}

// ==========================================
// ImportRunResult - 执行报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRunResult {
    pub run_id: String,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
    pub dry_run: bool,
    pub summary: String,
}

impl ImportRunResult {
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.skipped + self.failures.len()
    }

    /// 计数是否一致（用于比较试运行与正式运行）
    pub fn same_counts(&self, other: &ImportRunResult) -> bool {
        self.created == other.created
            && self.updated == other.updated
            && self.skipped == other.skipped
            && self.failures.len() == other.failures.len()
    }
}
