// ==========================================
// 业务管理套件 - 内存目标存储
// ==========================================
// 用途: 无数据库场景（测试、演示、调用方自带持久化前的预演）
// ==========================================

use crate::domain::{EntityType, MappedRecord, NaturalKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    records: HashMap<String, MappedRecord>,
    keys: HashMap<(EntityType, NaturalKey), String>,
    next_id: u64,
}

/// 内存存储（自然键唯一）
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: Mutex<MemoryState>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置已存在记录，返回其 ID
    pub fn seed(&self, record: MappedRecord) -> RepositoryResult<String> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Self::insert(&mut state, record)
    }

    pub fn get(&self, id: &str) -> Option<MappedRecord> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.records.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(state: &mut MemoryState, record: MappedRecord) -> RepositoryResult<String> {
        let entity = record.entity_type();
        if let Some(key) = record.natural_key() {
            if state.keys.contains_key(&(entity, key.clone())) {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "{}.{}={}",
                    entity, key.field, key.value
                )));
            }
            state.next_id += 1;
            let id = format!("mem-{}", state.next_id);
            state.keys.insert((entity, key), id.clone());
            state.records.insert(id.clone(), record);
            return Ok(id);
        }

        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);
        state.records.insert(id.clone(), record);
        Ok(id)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_existing(
        &self,
        entity: EntityType,
        key: &NaturalKey,
    ) -> RepositoryResult<Option<String>> {
        let state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(state.keys.get(&(entity, key.clone())).cloned())
    }

    async fn create(&self, record: &MappedRecord) -> RepositoryResult<String> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Self::insert(&mut state, record.clone())
    }

    async fn update(&self, id: &str, record: &MappedRecord) -> RepositoryResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        match state.records.get_mut(id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity: record.entity_type().to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn count(&self, entity: EntityType) -> RepositoryResult<usize> {
        let state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(state
            .records
            .values()
            .filter(|r| r.entity_type() == entity)
            .count())
    }
}
