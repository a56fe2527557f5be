// ==========================================
// 业务管理套件 - 预编译正则
// ==========================================
// 说明: 编译失败时为 None，匹配一律视为不命中
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;

pub type Pattern = Lazy<Option<Regex>>;

/// 判断值是否命中预编译正则
pub fn is_match(pattern: &Pattern, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

pub static EMAIL: Pattern = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub static PHONE: Pattern = Lazy::new(|| Regex::new(r"^(\+|00)?[\d\s\-/()]{9,20}$").ok());

pub static DATE: Pattern = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}\.\s*\d{1,2}\.\s*(\d{2}|\d{4})|\d{4}-\d{1,2}-\d{1,2})$").ok()
});

pub static NUMBER: Pattern = Lazy::new(|| {
    Regex::new(r"(?i)^-?\d[\d\s.,]*(\s*(kč|czk|eur|€|,-))?$").ok()
});

pub static URL: Pattern = Lazy::new(|| {
    Regex::new(r"(?i)^(https?://)?[a-z0-9][a-z0-9.-]*\.[a-z]{2,}(/\S*)?$").ok()
});

pub static ZIP: Pattern = Lazy::new(|| Regex::new(r"^\d{3}\s?\d{2}$").ok());

pub static VARIABLE_SYMBOL: Pattern = Lazy::new(|| Regex::new(r"^\d{1,10}$").ok());

pub static DOT_GROUPING: Pattern = Lazy::new(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+$").ok());

pub static DURATION_CLOCK: Pattern = Lazy::new(|| Regex::new(r"^(\d{1,2}):([0-5]\d)$").ok());

// 时长片段: 数值 + 可选单位（h/hod…/min…）
pub static DURATION_PART: Pattern = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(h|hod\w*|min\w*)?").ok()
});
