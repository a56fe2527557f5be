// ==========================================
// 业务管理套件 - 导入层
// ==========================================
// 流程: 文件 → TableParser → 建议映射 → 操作员调整映射
//       → Validator → 操作员决定 → ImportExecutor → 结果
// ==========================================

// 模块声明
pub mod clock;
pub mod error;
pub mod executor;
pub mod file_parser;
pub mod locale;
pub mod mappers;
pub mod patterns;
pub mod rules;
pub mod transformers;
pub mod validator;

// 重导出核心类型
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ImportError, ImportResult};
pub use executor::ImportExecutor;
pub use file_parser::{column_stats, ParseOptions, TableParser};
pub use locale::{CzechLocale, LocaleStrategy};
pub use mappers::{check_mapping, mapper_for, EntityMapper, ProjectionContext};
pub use rules::{FieldKind, FieldRule, RowRule, RuleSet};
pub use transformers::FieldTransformer;
pub use validator::Validator;
