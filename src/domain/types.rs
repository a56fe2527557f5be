// ==========================================
// 业务管理套件 - 导入领域类型定义
// ==========================================
// 用途: 实体类型、推断类型、行状态与问题级别
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 目标实体类型 (Entity Type)
// ==========================================
// 序列化格式: snake_case (与前端实体选择器一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    CustomerCompany, // 客户（公司）
    CustomerPerson,  // 客户（个人）
    Invoice,         // 发票
    Order,           // 订单（活动/摄影预约）
    Performance,     // 演出节目
    Game,            // 儿童游戏
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::CustomerCompany,
        EntityType::CustomerPerson,
        EntityType::Invoice,
        EntityType::Order,
        EntityType::Performance,
        EntityType::Game,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::CustomerCompany => "customer_company",
            EntityType::CustomerPerson => "customer_person",
            EntityType::Invoice => "invoice",
            EntityType::Order => "order",
            EntityType::Performance => "performance",
            EntityType::Game => "game",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 兼容前端历史写法（连字符）
        let normalized = s.trim().to_lowercase().replace('-', "_");
        EntityType::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| format!("未知实体类型: {}", s))
    }
}

// ==========================================
// 行分类 (Row Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowStatus {
    Valid,       // 无错误无警告
    HasWarnings, // 仅警告（允许导入）
    HasErrors,   // 存在错误（阻断该行）
}

impl RowStatus {
    /// 无错误即视为可导入（警告不阻断）
    pub fn is_importable(&self) -> bool {
        !matches!(self, RowStatus::HasErrors)
    }
}

// ==========================================
// 问题级别 (Severity)
// ==========================================
// 红线: 仅必填字段违规为 Error，其余均为 Warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ==========================================
// 列类型推断结果 (仅用于诊断展示)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Email,
    Phone,
    Date,
    Number,
    String,
}
