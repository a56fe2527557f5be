// ==========================================
// 业务管理套件 - 导入执行器
// ==========================================
// 职责: 按输入顺序逐行投影 → 冲突处置 → 落库（或试运行不落库）
// 红线: 单行失败只记录，不中断批次
// 红线: 试运行与正式运行走同一决策路径，计数一致
// 说明: 每行落库为独立工作单元，无跨批次事务
// ==========================================

use crate::domain::{
    ColumnMapping, ImportOptions, ImportRunResult, MappedRecord, NaturalKey, RawRow, RowFailure,
    RowOutcome, RowStatus,
};
use crate::i18n::{t, t_with_args};
use crate::importer::mappers::{EntityMapper, ProjectionContext};
use crate::repository::{RecordStore, RepositoryError, RepositoryResult};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportExecutor
// ==========================================
pub struct ImportExecutor<'a> {
    mapper: &'a dyn EntityMapper,
    store: &'a dyn RecordStore,
    ctx: ProjectionContext<'a>,
}

/// 本次运行已新建的自然键 → ID（试运行为临时 ID）
type RunLedger = HashMap<NaturalKey, String>;

impl<'a> ImportExecutor<'a> {
    pub fn new(
        mapper: &'a dyn EntityMapper,
        store: &'a dyn RecordStore,
        ctx: ProjectionContext<'a>,
    ) -> Self {
        Self { mapper, store, ctx }
    }

    /// 执行导入（全部行）
    pub async fn execute(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        options: ImportOptions,
    ) -> ImportRunResult {
        self.run(rows, mapping, None, options).await
    }

    /// 执行导入（校验结果为 hasErrors 的行直接记为失败）
    pub async fn execute_validated(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        statuses: &[RowStatus],
        options: ImportOptions,
    ) -> ImportRunResult {
        self.run(rows, mapping, Some(statuses), options).await
    }

    #[instrument(skip_all, fields(
        entity = %self.mapper.entity_type(),
        rows = rows.len(),
        dry_run = options.dry_run,
        run_id = tracing::field::Empty
    ))]
    async fn run(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        statuses: Option<&[RowStatus]>,
        options: ImportOptions,
    ) -> ImportRunResult {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(
            skip_existing = options.skip_existing,
            update_existing = options.update_existing,
            "开始执行导入"
        );

        let mut ledger = RunLedger::new();
        let mut results = Vec::with_capacity(rows.len());
        for (row_index, raw) in rows.iter().enumerate() {
            let blocked = statuses
                .and_then(|s| s.get(row_index))
                .is_some_and(|status| !status.is_importable());

            let result = if blocked {
                Err(RowFailure {
                    row_index,
                    message: t("executor.row_invalid"),
                })
            } else {
                self.process_row(row_index, raw, mapping, options, &mut ledger)
                    .await
            };

            if let Err(failure) = &result {
                warn!(row_index, message = %failure.message, "行导入失败");
            }
            results.push(result);
        }

        let result = reduce(run_id, results, options.dry_run);
        info!(
            created = result.created,
            updated = result.updated,
            skipped = result.skipped,
            failed = result.failures.len(),
            "导入执行完成"
        );
        result
    }

    /// 单行: 投影 → 查重 → 按策略处置
    async fn process_row(
        &self,
        row_index: usize,
        raw: &RawRow,
        mapping: &ColumnMapping,
        options: ImportOptions,
        ledger: &mut RunLedger,
    ) -> Result<RowOutcome, RowFailure> {
        let failure = |message: String| RowFailure { row_index, message };

        let row = mapping.apply(raw);
        let record = self
            .mapper
            .project(&row, row_index, &self.ctx)
            .ok_or_else(|| failure(t("executor.projection_failed")))?;

        let key = record.natural_key();
        let existing = match &key {
            Some(key) => self
                .lookup(key, ledger)
                .await
                .map_err(|e| failure(persistence_message(&e)))?,
            None => None,
        };

        match (existing, key) {
            (Some(id), _) if options.update_existing => {
                if !options.dry_run {
                    self.store
                        .update(&id, &record)
                        .await
                        .map_err(|e| failure(persistence_message(&e)))?;
                }
                debug!(row_index, id = %id, "更新已存在记录");
                Ok(RowOutcome::Updated { id })
            }
            (Some(existing_id), _) if options.skip_existing => {
                debug!(row_index, existing_id = %existing_id, "跳过已存在记录");
                Ok(RowOutcome::Skipped { existing_id })
            }
            (Some(_), Some(key)) => Err(failure(t_with_args(
                "executor.conflict",
                &[("field", key.field.as_str()), ("value", key.value.as_str())],
            ))),
            (_, key) => {
                let id = self
                    .create(&record, options.dry_run)
                    .await
                    .map_err(|e| failure(persistence_message(&e)))?;
                if let Some(key) = key {
                    let ledger_id = id
                        .clone()
                        .unwrap_or_else(|| format!("dry-run-{}", row_index));
                    ledger.insert(key, ledger_id);
                }
                debug!(row_index, name = %record.display_name(), "新建记录");
                Ok(RowOutcome::Created { id })
            }
        }
    }

    /// 先查本次运行台账，再查目标存储
    async fn lookup(
        &self,
        key: &NaturalKey,
        ledger: &RunLedger,
    ) -> RepositoryResult<Option<String>> {
        if let Some(id) = ledger.get(key) {
            return Ok(Some(id.clone()));
        }
        self.store.find_existing(self.mapper.entity_type(), key).await
    }

    async fn create(
        &self,
        record: &MappedRecord,
        dry_run: bool,
    ) -> RepositoryResult<Option<String>> {
        if dry_run {
            return Ok(None);
        }
        self.store.create(record).await.map(Some)
    }
}

fn persistence_message(error: &RepositoryError) -> String {
    t_with_args(
        "executor.persistence_failed",
        &[("error", error.to_string().as_str())],
    )
}

/// 逐行结果归约为执行报告
fn reduce(
    run_id: String,
    results: Vec<Result<RowOutcome, RowFailure>>,
    dry_run: bool,
) -> ImportRunResult {
    let (mut created, mut updated, mut skipped) = (0, 0, 0);
    let mut failures = Vec::new();

    for result in results {
        match result {
            Ok(RowOutcome::Created { .. }) => created += 1,
            Ok(RowOutcome::Updated { .. }) => updated += 1,
            Ok(RowOutcome::Skipped { .. }) => skipped += 1,
            Err(failure) => failures.push(failure),
        }
    }

    let key = if dry_run {
        "executor.summary_dry_run"
    } else {
        "executor.summary"
    };
    let summary = t_with_args(
        key,
        &[
            ("created", created.to_string().as_str()),
            ("updated", updated.to_string().as_str()),
            ("skipped", skipped.to_string().as_str()),
            ("failed", failures.len().to_string().as_str()),
        ],
    );

    ImportRunResult {
        run_id,
        created,
        updated,
        skipped,
        failures,
        dry_run,
        summary,
    }
}
