// ==========================================
// 业务管理套件 - 地区解析策略
// ==========================================
// 职责: 隔离与地区相关的解析启发式
//   - 电话国家码 / 国内号码长度
//   - 增值税号国家前缀
//   - 两位年份分界
//   - 逗号作小数点还是千分位
//   - 双词姓名的先后顺序
// ==========================================

use crate::importer::patterns::{self, DOT_GROUPING};

/// 地区解析策略
pub trait LocaleStrategy: Send + Sync {
    /// 国际电话区号（不含 +）
    fn calling_code(&self) -> &str;

    /// 国内号码位数
    fn national_number_len(&self) -> usize;

    /// 增值税号国家前缀
    fn vat_prefix(&self) -> &str;

    /// 两位年份分界: 小于该值 → 20xx，否则 → 19xx
    fn year_pivot(&self) -> u32;

    /// 最后一个逗号之后的数字串是否应视为小数部分
    fn comma_is_decimal(&self, digits_after_comma: &str) -> bool;

    /// 整串是否为以点分组的千分位写法（如 2.500.000）
    fn dot_is_grouping(&self, number: &str) -> bool;

    /// 是否为常见名（用于判断双词姓名顺序）
    fn is_common_first_name(&self, token: &str) -> bool;
}

// ==========================================
// CzechLocale - 捷克默认策略
// ==========================================

const CZECH_FIRST_NAMES: &[&str] = &[
    // 男
    "jan", "petr", "pavel", "tomáš", "martin", "jiří", "josef", "jaroslav", "michal", "lukáš",
    "jakub", "david", "ondřej", "marek", "karel", "milan", "vojtěch", "filip", "adam", "matěj",
    "václav", "zdeněk", "miroslav", "františek", "stanislav",
    // 女
    "marie", "jana", "eva", "hana", "anna", "lenka", "kateřina", "lucie", "věra", "alena",
    "petra", "veronika", "martina", "tereza", "michaela", "jitka", "zuzana", "barbora",
    "markéta", "klára", "ivana", "monika", "eliška", "kristýna",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct CzechLocale;

impl LocaleStrategy for CzechLocale {
    fn calling_code(&self) -> &str {
        "420"
    }

    fn national_number_len(&self) -> usize {
        9
    }

    fn vat_prefix(&self) -> &str {
        "CZ"
    }

    fn year_pivot(&self) -> u32 {
        50
    }

    fn comma_is_decimal(&self, digits_after_comma: &str) -> bool {
        digits_after_comma.len() <= 2
    }

    fn dot_is_grouping(&self, number: &str) -> bool {
        patterns::is_match(&DOT_GROUPING, number)
    }

    fn is_common_first_name(&self, token: &str) -> bool {
        let lower = token.to_lowercase();
        CZECH_FIRST_NAMES.contains(&lower.as_str())
    }
}
