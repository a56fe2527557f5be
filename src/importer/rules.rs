// ==========================================
// 业务管理套件 - 声明式校验规则
// ==========================================
// 职责: 字段规则（必填/类型/正则/范围/长度/自定义）与行级规则的描述
// 说明: 规则由各 EntityMapper 声明，由 Validator 统一执行
// ==========================================

use crate::domain::{MappedRow, Severity};
use crate::importer::patterns::Pattern;
use crate::importer::transformers::FieldTransformer;

/// 字段值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Title, // 文本，按 slug 识别（slug 为空则无效）
    Email,
    Phone,
    CompanyId,
    VatId,
    Date,
    Number,
    Money,
    Duration,
    Gps,
    Url,
}

/// 自定义检查: 通过返回 None，失败返回消息键
pub type CustomCheck = fn(&str, &FieldTransformer) -> Option<&'static str>;

/// 行级检查: 通过返回 true
pub type RowCheck = fn(&MappedRow, &FieldTransformer) -> bool;

// ==========================================
// FieldRule
// ==========================================
#[derive(Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub pattern: Option<&'static Pattern>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub custom: Option<CustomCheck>,
}

impl FieldRule {
    pub fn new(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            required: false,
            pattern: None,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
            custom: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: &'static Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn length(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = Some(min_len);
        self.max_len = Some(max_len);
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn custom(mut self, check: CustomCheck) -> Self {
        self.custom = Some(check);
        self
    }
}

// ==========================================
// RowRule
// ==========================================
#[derive(Clone)]
pub struct RowRule {
    pub field: &'static str,       // 问题归属字段
    pub severity: Severity,
    pub message_key: &'static str, // i18n 消息键
    pub check: RowCheck,
}

impl RowRule {
    pub fn new(
        field: &'static str,
        severity: Severity,
        message_key: &'static str,
        check: RowCheck,
    ) -> Self {
        Self {
            field,
            severity,
            message_key,
            check,
        }
    }
}

// ==========================================
// RuleSet
// ==========================================
#[derive(Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<FieldRule>,
    pub unique_fields: Vec<&'static str>, // 批内查重字段
    pub row_rules: Vec<RowRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn unique(mut self, fields: &[&'static str]) -> Self {
        self.unique_fields.extend_from_slice(fields);
        self
    }

    pub fn row_rule(mut self, rule: RowRule) -> Self {
        self.row_rules.push(rule);
        self
    }

    pub fn rule_for(&self, field: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field == field)
    }
}

// ==========================================
// 通用自定义检查
// ==========================================

/// 布尔值可识别
pub fn check_bool(value: &str, _: &FieldTransformer) -> Option<&'static str> {
    FieldTransformer::parse_bool(value)
        .is_none()
        .then_some("validation.invalid_bool")
}

/// 三位字母货币代码
pub fn check_currency(value: &str, _: &FieldTransformer) -> Option<&'static str> {
    let ok = value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic());
    (!ok).then_some("validation.invalid_currency")
}

/// 行内两个数值字段满足 from ≤ to（任一缺失视为通过）
pub fn ordered_pair(row: &MappedRow, tf: &FieldTransformer, from: &str, to: &str) -> bool {
    let parse = |field: &str| {
        row.get(field)
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| tf.parse_number(v))
    };
    match (parse(from), parse(to)) {
        (Some(a), Some(b)) => a <= b,
        _ => true,
    }
}

/// 行内任一字段非空
pub fn any_present(row: &MappedRow, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|f| row.get(*f).is_some_and(|v| !v.trim().is_empty()))
}
