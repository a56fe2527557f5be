// ==========================================
// 业务管理套件 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 上传边界 =====

    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10 MiB
    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// 获取预览行数
    ///
    /// # 默认值
    /// - 10
    async fn get_preview_rows(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    // ===== 解析嗅探 =====

    /// 获取编码嗅探窗口（字节）
    ///
    /// # 默认值
    /// - 1000
    async fn get_encoding_sniff_bytes(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取分隔符嗅探行数
    ///
    /// # 默认值
    /// - 5
    async fn get_delimiter_sniff_lines(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    // ===== 列统计 =====

    /// 获取列类型推断采样行数
    ///
    /// # 默认值
    /// - 100
    async fn get_stats_sample_rows(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取列类型推断命中比例阈值
    ///
    /// # 默认值
    /// - 0.7
    async fn get_type_inference_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    // ===== 本地化 =====

    /// 获取操作员界面语言
    ///
    /// # 默认值
    /// - "cs"
    async fn get_operator_locale(&self) -> Result<String, Box<dyn Error + Send + Sync>>;
}
