// ==========================================
// 业务管理套件 - API层错误类型
// ==========================================
// 职责: 定义边界错误类型，将导入层/仓储层错误转换为调用方可展示的消息
// 说明: 行级问题不走 Err，以报告值返回
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("未知实体类型: {0}")]
    UnknownEntityType(String),

    // ==========================================
    // 文件错误（映射前中止）
    // ==========================================
    #[error("文件过大: {size} 字节（上限 {max} 字节）")]
    FileTooLarge { size: u64, max: u64 },

    #[error("文件格式不支持: {0}")]
    UnsupportedFormat(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileTooLarge { size, max } => ApiError::FileTooLarge { size, max },
            ImportError::UnsupportedFormat(name) => ApiError::UnsupportedFormat(name),
            ImportError::UnknownEntityType(name) => ApiError::UnknownEntityType(name),
            ImportError::Repository(err) => err.into(),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
