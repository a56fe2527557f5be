// ==========================================
// 业务管理套件 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅结构性错误走 Err；行级问题以报告值返回
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 结构性错误（映射前中止） =====
    #[error("无法识别表头行: {0}")]
    MalformedInput(String),

    #[error("文件没有数据行: {0}")]
    EmptyFile(String),

    #[error("文件过大: {size} 字节（上限 {max} 字节）")]
    FileTooLarge { size: u64, max: u64 },

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 调用参数错误 =====
    #[error("未知实体类型: {0}")]
    UnknownEntityType(String),

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
