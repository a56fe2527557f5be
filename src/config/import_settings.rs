// ==========================================
// 业务管理套件 - 导入运行参数
// ==========================================
// 职责: 将配置读取结果固化为一次导入调用使用的参数快照
// ==========================================

use crate::config::config_manager::defaults;
use crate::config::import_config_trait::ImportConfigReader;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// 导入参数快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSettings {
    pub max_file_size_bytes: u64,
    pub preview_rows: usize,
    pub encoding_sniff_bytes: usize,
    pub delimiter_sniff_lines: usize,
    pub stats_sample_rows: usize,
    pub type_inference_threshold: f64,
    pub operator_locale: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: defaults::MAX_FILE_SIZE_BYTES,
            preview_rows: defaults::PREVIEW_ROWS,
            encoding_sniff_bytes: defaults::ENCODING_SNIFF_BYTES,
            delimiter_sniff_lines: defaults::DELIMITER_SNIFF_LINES,
            stats_sample_rows: defaults::STATS_SAMPLE_ROWS,
            type_inference_threshold: defaults::TYPE_INFERENCE_THRESHOLD,
            operator_locale: defaults::OPERATOR_LOCALE.to_string(),
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载全部参数
    pub async fn load<R>(reader: &R) -> Result<Self, Box<dyn Error + Send + Sync>>
    where
        R: ImportConfigReader + ?Sized,
    {
        let settings = Self {
            max_file_size_bytes: reader.get_max_file_size_bytes().await?,
            preview_rows: reader.get_preview_rows().await?,
            encoding_sniff_bytes: reader.get_encoding_sniff_bytes().await?,
            delimiter_sniff_lines: reader.get_delimiter_sniff_lines().await?,
            stats_sample_rows: reader.get_stats_sample_rows().await?,
            type_inference_threshold: reader.get_type_inference_threshold().await?,
            operator_locale: reader.get_operator_locale().await?,
        };

        tracing::debug!(?settings, "导入参数已加载");
        Ok(settings)
    }
}
