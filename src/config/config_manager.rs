// ==========================================
// 业务管理套件 - 配置管理器
// ==========================================
// 职责: 导入配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 读取并解析配置，缺失或格式错误时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Copy,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_file_size_bytes(&self) -> Result<u64, ConfigError> {
        self.get_parsed_or_default(config_keys::MAX_FILE_SIZE_BYTES, defaults::MAX_FILE_SIZE_BYTES)
    }

    async fn get_preview_rows(&self) -> Result<usize, ConfigError> {
        self.get_parsed_or_default(config_keys::PREVIEW_ROWS, defaults::PREVIEW_ROWS)
    }

    async fn get_encoding_sniff_bytes(&self) -> Result<usize, ConfigError> {
        self.get_parsed_or_default(config_keys::ENCODING_SNIFF_BYTES, defaults::ENCODING_SNIFF_BYTES)
    }

    async fn get_delimiter_sniff_lines(&self) -> Result<usize, ConfigError> {
        self.get_parsed_or_default(
            config_keys::DELIMITER_SNIFF_LINES,
            defaults::DELIMITER_SNIFF_LINES,
        )
    }

    async fn get_stats_sample_rows(&self) -> Result<usize, ConfigError> {
        self.get_parsed_or_default(config_keys::STATS_SAMPLE_ROWS, defaults::STATS_SAMPLE_ROWS)
    }

    async fn get_type_inference_threshold(&self) -> Result<f64, ConfigError> {
        let value = self.get_parsed_or_default(
            config_keys::TYPE_INFERENCE_THRESHOLD,
            defaults::TYPE_INFERENCE_THRESHOLD,
        )?;
        if !(0.0..=1.0).contains(&value) {
            tracing::warn!(value, "类型推断阈值超出 [0, 1]，使用默认值");
            return Ok(defaults::TYPE_INFERENCE_THRESHOLD);
        }
        Ok(value)
    }

    async fn get_operator_locale(&self) -> Result<String, ConfigError> {
        Ok(self
            .get_config_value(config_keys::OPERATOR_LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults::OPERATOR_LOCALE.to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 上传边界
    pub const MAX_FILE_SIZE_BYTES: &str = "import_max_file_size_bytes";
    pub const PREVIEW_ROWS: &str = "import_preview_rows";

    // 解析嗅探
    pub const ENCODING_SNIFF_BYTES: &str = "import_encoding_sniff_bytes";
    pub const DELIMITER_SNIFF_LINES: &str = "import_delimiter_sniff_lines";

    // 列统计
    pub const STATS_SAMPLE_ROWS: &str = "import_stats_sample_rows";
    pub const TYPE_INFERENCE_THRESHOLD: &str = "import_type_inference_threshold";

    // 本地化
    pub const OPERATOR_LOCALE: &str = "import_operator_locale";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    pub const PREVIEW_ROWS: usize = 10;
    pub const ENCODING_SNIFF_BYTES: usize = 1000;
    pub const DELIMITER_SNIFF_LINES: usize = 5;
    pub const STATS_SAMPLE_ROWS: usize = 100;
    pub const TYPE_INFERENCE_THRESHOLD: f64 = 0.7;
    pub const OPERATOR_LOCALE: &str = "cs";
}
