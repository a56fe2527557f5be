// ==========================================
// 业务管理套件 - CSV 导入管道核心库
// ==========================================
// 技术栈: Rust + SQLite
// 流程: 解析 → 映射建议 → 校验 → 试运行 → 执行
// 系统定位: 无头库，由请求处理器调用（操作员最终决定是否提交）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "cs");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值对象与类型
pub mod domain;

// 数据仓储层 - 目标存储
pub mod repository;

// 导入层 - 解析/规范化/映射/校验/执行
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 边界接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ColumnMapping, EntityType, ImportOptions, ImportRunResult, MappedRecord, ParsedTable,
    RowStatus, Severity, ValidationOutcome,
};

// 导入管道
pub use importer::{
    FieldTransformer, ImportError, ImportExecutor, ImportResult, TableParser, Validator,
};

// 存储
pub use repository::{InMemoryRecordStore, RecordStore, SqliteRecordStore};

// API
pub use api::{ApiError, ApiResult, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "suite-import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
