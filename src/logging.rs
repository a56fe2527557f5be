// ==========================================
// 日志系统初始化
// ==========================================
// 结构化字段: run_id / row_index / entity / created / skipped
// 输出格式: 文本（默认）或 JSON（供请求处理器的日志采集）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式选择的环境变量
pub const LOG_FORMAT_ENV: &str = "SUITE_IMPORT_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 解析格式名（"json" 不区分大小写），其余一律为文本
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or(LogFormat::Text)
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=suite_import::importer=debug
/// - SUITE_IMPORT_LOG_FORMAT: "json" 时输出 JSON 行
///
/// # 示例
/// ```no_run
/// use suite_import::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Text => builder.init(),
    }
}

/// 初始化测试环境的日志系统（可重复调用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("suite_import=debug"))
        .with_test_writer()
        .try_init();
}
