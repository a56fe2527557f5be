// ==========================================
// 业务管理套件 - API 层
// ==========================================
// 职责: 提供导入边界接口,供请求处理器调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{
    EntityFieldConfig, ExecuteRequest, ImportApi, UploadResponse, ValidateRequest,
    ValidateResponse,
};
