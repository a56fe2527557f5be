// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持捷克语（默认，操作员界面语言）和英文
// 消息目录: locales/cs.yml, locales/en.yml
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use tracing::warn;

/// 已提供消息目录的语言
pub const SUPPORTED_LOCALES: &[&str] = &["cs", "en"];

/// 默认语言（操作员界面）
pub const DEFAULT_LOCALE: &str = "cs";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 规范化语言代码: "en-US" / "EN" → "en"；无目录的语言退回默认
pub fn resolve_locale(locale: &str) -> &'static str {
    let primary = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| *l == primary)
        .unwrap_or(DEFAULT_LOCALE)
}

/// 设置语言（配置来源不可信，先规范化）
///
/// # 参数
/// - locale: 语言代码（"cs" 或 "en"，允许地区后缀）
pub fn set_locale(locale: &str) {
    let resolved = resolve_locale(locale);
    if !locale.eq_ignore_ascii_case(resolved) {
        warn!(requested = locale, resolved, "语言代码已规范化");
    }
    rust_i18n::set_locale(resolved);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use suite_import::i18n::t;
/// let msg = t("executor.row_invalid");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use suite_import::i18n::t_with_args;
/// let msg = t_with_args("validation.required", &[("field", "Název")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
