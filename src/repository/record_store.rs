// ==========================================
// 业务管理套件 - 目标存储 Trait
// ==========================================
// 职责: 定义导入落库所需的最小能力接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 说明: 并发安全（唯一约束/乐观锁）由实现方在存储层保证
// ==========================================

use crate::domain::{EntityType, MappedRecord, NaturalKey};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RecordStore Trait
// ==========================================
// 用途: ImportExecutor / Validator 访问目标数据
// 实现者: SqliteRecordStore, InMemoryRecordStore
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 按自然键查找已存在记录
    ///
    /// # 返回
    /// - Ok(Some(id)): 已存在
    /// - Ok(None): 不存在
    async fn find_existing(
        &self,
        entity: EntityType,
        key: &NaturalKey,
    ) -> RepositoryResult<Option<String>>;

    /// 新建记录
    ///
    /// # 返回
    /// - Ok(id): 新记录 ID
    async fn create(&self, record: &MappedRecord) -> RepositoryResult<String>;

    /// 原地更新记录
    async fn update(&self, id: &str, record: &MappedRecord) -> RepositoryResult<()>;

    /// 统计某实体记录数
    async fn count(&self, entity: EntityType) -> RepositoryResult<usize>;
}
