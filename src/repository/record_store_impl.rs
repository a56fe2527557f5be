// ==========================================
// 业务管理套件 - SQLite 目标存储实现
// ==========================================
// 职责: 实现 RecordStore（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 说明: 每行独立提交（无批次级事务），唯一约束兜底并发重复创建
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{EntityType, MappedRecord, NaturalKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 创建新的存储实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建存储（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取记录负载（测试/排查用）
    pub fn load(&self, id: &str) -> RepositoryResult<MappedRecord> {
        let conn = self.lock()?;
        let payload: String = conn
            .query_row(
                "SELECT payload FROM import_record WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "import_record".to_string(),
                id: id.to_string(),
            })?;

        Ok(serde_json::from_str(&payload)?)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_existing(
        &self,
        entity: EntityType,
        key: &NaturalKey,
    ) -> RepositoryResult<Option<String>> {
        let conn = self.lock()?;

        let id = conn
            .query_row(
                r#"
                SELECT id FROM import_record
                WHERE entity_type = ?1 AND natural_key_field = ?2 AND natural_key = ?3
                "#,
                params![entity.as_str(), key.field, key.value],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(id)
    }

    async fn create(&self, record: &MappedRecord) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(record)?;
        let key = record.natural_key();
        let now = Utc::now();

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_record (
                id, entity_type, natural_key_field, natural_key, payload, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                id,
                record.entity_type().as_str(),
                key.as_ref().map(|k| k.field.clone()),
                key.as_ref().map(|k| k.value.clone()),
                payload,
                now,
            ],
        )?;

        Ok(id)
    }

    async fn update(&self, id: &str, record: &MappedRecord) -> RepositoryResult<()> {
        let payload = serde_json::to_string(record)?;

        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE import_record SET payload = ?1, updated_at = ?2 WHERE id = ?3",
            params![payload, Utc::now(), id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: record.entity_type().to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    async fn count(&self, entity: EntityType) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM import_record WHERE entity_type = ?1",
            params![entity.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Performance, RichTextBlock};
    use tempfile::NamedTempFile;

    fn performance(title: &str, slug: &str) -> MappedRecord {
        MappedRecord::Performance(Performance {
            title: title.to_string(),
            slug: slug.to_string(),
            description: Vec::<RichTextBlock>::new(),
            duration_minutes: Some(60),
            price: Some(4500),
            age_from: Some(3),
            age_to: None,
            max_children: None,
            category: None,
            is_active: true,
        })
    }

    fn setup() -> (NamedTempFile, SqliteRecordStore) {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteRecordStore::new(temp.path().to_str().unwrap()).unwrap();
        (temp, store)
    }

    #[tokio::test]
    async fn test_create_then_find_existing() {
        let (_temp, store) = setup();
        let record = performance("Pirátská výprava", "piratska-vyprava");

        let id = store.create(&record).await.unwrap();
        let found = store
            .find_existing(EntityType::Performance, &NaturalKey::new("slug", "piratska-vyprava"))
            .await
            .unwrap();

        assert_eq!(found, Some(id));
        assert_eq!(store.count(EntityType::Performance).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_natural_key_hits_unique_constraint() {
        let (_temp, store) = setup();
        let record = performance("Kouzelník", "kouzelnik");

        store.create(&record).await.unwrap();
        let second = store.create(&record).await;

        assert!(matches!(
            second,
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_payload() {
        let (_temp, store) = setup();
        let id = store
            .create(&performance("Kouzelník", "kouzelnik"))
            .await
            .unwrap();

        store
            .update(&id, &performance("Kouzelník Pepa", "kouzelnik"))
            .await
            .unwrap();

        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.display_name(), "Kouzelník Pepa");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (_temp, store) = setup();
        let result = store
            .update("missing", &performance("X", "x"))
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}
