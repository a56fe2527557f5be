// ==========================================
// 业务管理套件 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 导入管道所需表（config_kv / import_record）幂等建表
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SUITE_IMPORT_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接、应用统一配置并确保导入表存在
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// 幂等建表
///
/// - config_kv: 导入配置（scope_id + key）
/// - import_record: 导入目标记录；自然键唯一约束用于兜底并发重复创建
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS import_record (
            id TEXT PRIMARY KEY,
            entity_type TEXT NOT NULL,
            natural_key_field TEXT,
            natural_key TEXT,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (entity_type, natural_key_field, natural_key)
        );

        CREATE INDEX IF NOT EXISTS idx_import_record_entity
            ON import_record (entity_type);
        "#,
    )
}

/// 默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".");
    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir.join("suite-import");
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!(error = %e, dir = %path.display(), "无法创建数据目录，回退到当前目录");
            path = PathBuf::from(".");
        }
    }

    path.join("suite_import.db").to_string_lossy().to_string()
}
