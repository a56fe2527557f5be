// ==========================================
// 业务管理套件 - 导入 API
// ==========================================
// 职责: 上传 / 校验 / 执行 三个边界操作，供请求处理器调用
// 说明: API 不持有跨调用的可变状态，映射与选项由调用方每次显式传入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportSettings};
use crate::db::open_sqlite_connection;
use crate::domain::{
    ColumnMapping, ColumnStats, EntityType, ImportOptions, ImportRunResult, MappedRecord,
    ParseDiagnostic, RawRow, TargetFieldDescriptor, ValidationOutcome,
};
use crate::importer::{
    column_stats, mapper_for, Clock, FieldTransformer, ImportError, ImportExecutor,
    ParseOptions, ProjectionContext, SystemClock, TableParser, Validator,
};
use crate::repository::{RecordStore, SqliteRecordStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// 请求 / 响应 DTO
// ==========================================

/// 上传响应中的实体字段配置
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFieldConfig {
    pub required_fields: Vec<String>,
    pub target_fields: Vec<TargetFieldDescriptor>,
}

/// 上传响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub file_size: u64,
    pub row_count: usize,
    pub headers: Vec<String>,
    pub preview: Vec<RawRow>,
    pub all_data: Vec<RawRow>,
    pub suggested_mapping: ColumnMapping,
    pub config: EntityFieldConfig,
    pub delimiter: char,
    pub encoding: String,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub column_stats: Vec<ColumnStats>,
}

/// 校验请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub entity_type: EntityType,
    pub data: Vec<RawRow>,
    pub column_mapping: ColumnMapping,
}

/// 校验响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub outcome: ValidationOutcome,
    pub preview: Vec<MappedRecord>, // 规范化后的记录预览
}

/// 执行请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub entity_type: EntityType,
    pub data: Vec<RawRow>,
    pub column_mapping: ColumnMapping,
    #[serde(default)]
    pub options: ImportOptions,
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi<S: RecordStore> {
    store: Arc<S>,
    settings: ImportSettings,
    transformer: FieldTransformer,
    clock: Arc<dyn Clock>,
}

impl<S: RecordStore> ImportApi<S> {
    /// 创建新的ImportApi实例（系统时钟 + 默认地区策略）
    pub fn new(store: Arc<S>, settings: ImportSettings) -> Self {
        Self {
            store,
            settings,
            transformer: FieldTransformer::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// 注入时钟（测试冻结时间）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 注入字段转换器（替换地区策略）
    pub fn with_transformer(mut self, transformer: FieldTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn store(&self) -> &S {
        self.store.as_ref()
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn projection_context(&self) -> ProjectionContext<'_> {
        ProjectionContext {
            transformer: &self.transformer,
            clock: self.clock.as_ref(),
        }
    }

    // ==========================================
    // 上传
    // ==========================================

    /// 上传文件内容: 大小/格式检查 → 解析 → 建议映射
    ///
    /// # 错误
    /// - FileTooLarge / UnsupportedFormat: 映射前拒绝
    /// - ImportError: 无表头或无数据行
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        entity: EntityType,
    ) -> ApiResult<UploadResponse> {
        let size = bytes.len() as u64;
        if size > self.settings.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                max: self.settings.max_file_size_bytes,
            }
            .into());
        }

        let is_csv = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(ImportError::UnsupportedFormat(file_name.to_string()).into());
        }

        let table = TableParser::parse(bytes, &ParseOptions::from_settings(&self.settings))?;
        if table.row_count == 0 {
            return Err(ImportError::EmptyFile(file_name.to_string()).into());
        }
        if !table.diagnostics.is_empty() {
            warn!(count = table.diagnostics.len(), "解析产生诊断信息");
        }

        let mapper = mapper_for(entity);
        let suggested_mapping = mapper.suggest(&table.headers);
        let stats = column_stats(
            &table,
            self.settings.stats_sample_rows,
            self.settings.type_inference_threshold,
        );

        info!(
            entity = %entity,
            rows = table.row_count,
            columns = table.headers.len(),
            suggested = suggested_mapping.len(),
            "文件上传解析完成"
        );

        Ok(UploadResponse {
            file_name: file_name.to_string(),
            file_size: size,
            row_count: table.row_count,
            preview: table.preview(self.settings.preview_rows),
            suggested_mapping,
            config: EntityFieldConfig {
                required_fields: mapper
                    .required_fields()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                target_fields: mapper.target_fields(),
            },
            delimiter: table.delimiter,
            encoding: table.encoding,
            diagnostics: table.diagnostics,
            column_stats: stats,
            headers: table.headers,
            all_data: table.rows,
        })
    }

    /// 从磁盘路径上传
    pub async fn upload_from_path(
        &self,
        path: impl AsRef<Path>,
        entity: EntityType,
    ) -> ApiResult<UploadResponse> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await.map_err(ImportError::from)?;
        if metadata.len() > self.settings.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size: metadata.len(),
                max: self.settings.max_file_size_bytes,
            }
            .into());
        }

        let bytes = tokio::fs::read(path).await.map_err(ImportError::from)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        self.upload(&file_name, &bytes, entity)
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验映射后数据，并检测已存在记录
    #[instrument(skip(self, request), fields(entity = %request.entity_type, rows = request.data.len()))]
    pub async fn validate(&self, request: ValidateRequest) -> ApiResult<ValidateResponse> {
        let mapper = mapper_for(request.entity_type);
        let validator = Validator::new(mapper, &self.transformer);
        let ctx = self.projection_context();

        let mut outcome = validator.validate(&request.data, &request.column_mapping);
        if outcome.mapping_errors.is_empty() {
            let existing = validator
                .detect_existing(
                    &request.data,
                    &request.column_mapping,
                    &outcome,
                    self.store.as_ref(),
                    &ctx,
                )
                .await?;
            outcome.attach_existing(existing);
        }

        let preview = request
            .data
            .iter()
            .enumerate()
            .filter(|(row_index, _)| {
                outcome
                    .row_statuses
                    .get(*row_index)
                    .is_some_and(|s| s.is_importable())
            })
            .filter_map(|(row_index, raw)| {
                mapper.project(&request.column_mapping.apply(raw), row_index, &ctx)
            })
            .take(self.settings.preview_rows)
            .collect();

        Ok(ValidateResponse { outcome, preview })
    }

    // ==========================================
    // 执行
    // ==========================================

    /// 执行导入（或试运行）
    ///
    /// 映射存在问题时拒绝执行；校验错误行记为行级失败
    #[instrument(skip(self, request), fields(entity = %request.entity_type, rows = request.data.len()))]
    pub async fn execute(&self, request: ExecuteRequest) -> ApiResult<ImportRunResult> {
        let mapper = mapper_for(request.entity_type);
        let validator = Validator::new(mapper, &self.transformer);

        let outcome = validator.validate(&request.data, &request.column_mapping);
        if !outcome.mapping_errors.is_empty() {
            let reasons: Vec<String> = outcome
                .mapping_errors
                .iter()
                .map(|issue| issue.message.clone())
                .collect();
            return Err(ApiError::InvalidInput(reasons.join("; ")));
        }

        let store: &dyn RecordStore = self.store.as_ref();
        let executor = ImportExecutor::new(mapper, store, self.projection_context());
        Ok(executor
            .execute_validated(
                &request.data,
                &request.column_mapping,
                &outcome.row_statuses,
                request.options,
            )
            .await)
    }
}

impl ImportApi<SqliteRecordStore> {
    /// 基于 SQLite 数据库创建（共享一个连接，配置从 config_kv 加载）
    pub async fn with_sqlite(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::InternalError(format!("配置初始化失败: {}", e)))?;
        let settings = ImportSettings::load(&config)
            .await
            .map_err(|e| ApiError::InternalError(format!("配置加载失败: {}", e)))?;
        crate::i18n::set_locale(&settings.operator_locale);

        info!(db_path, locale = %settings.operator_locale, "导入 API 已初始化");
        Ok(Self::new(
            Arc::new(SqliteRecordStore::from_connection(conn)),
            settings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRecordStore;

    fn api() -> ImportApi<InMemoryRecordStore> {
        ImportApi::new(Arc::new(InMemoryRecordStore::new()), ImportSettings::default())
    }

    #[test]
    fn test_upload_rejects_non_csv() {
        let err = api()
            .upload("data.xlsx", b"a;b\n1;2\n", EntityType::Game)
            .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_upload_rejects_oversized_file() {
        let settings = ImportSettings {
            max_file_size_bytes: 4,
            ..ImportSettings::default()
        };
        let api = ImportApi::new(Arc::new(InMemoryRecordStore::new()), settings);

        let err = api
            .upload("data.csv", b"Nazev\nKlaun\n", EntityType::Game)
            .unwrap_err();
        assert!(matches!(err, ApiError::FileTooLarge { max: 4, .. }));
    }

    #[test]
    fn test_upload_rejects_header_only_file() {
        let err = api()
            .upload("data.csv", "Název hry;Popis\n".as_bytes(), EntityType::Game)
            .unwrap_err();
        assert!(matches!(err, ApiError::ImportError(_)));
    }

    #[test]
    fn test_upload_suggests_mapping_and_config() {
        let csv = "Název hry;Pravidla;Min. hráčů\nSchovávaná;Jeden hledá;3\nPáka;;2\n";
        let response = api()
            .upload("hry.csv", csv.as_bytes(), EntityType::Game)
            .unwrap();

        assert_eq!(response.row_count, 2);
        assert_eq!(response.delimiter, ';');
        assert_eq!(response.suggested_mapping.target_of("Název hry"), Some("title"));
        assert_eq!(response.config.required_fields, vec!["title"]);
        assert!(response.config.target_fields.iter().any(|f| f.id == "_skip"));
        assert_eq!(response.all_data.len(), 2);
    }
}
