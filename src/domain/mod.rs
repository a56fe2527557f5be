// ==========================================
// 业务管理套件 - 领域层
// ==========================================
// 约定: 均为单次管道调用内创建与丢弃的值对象
// ==========================================

pub mod import_run;
pub mod mapping;
pub mod record;
pub mod table;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use import_run::{ImportOptions, ImportRunResult, RowFailure, RowOutcome};
pub use mapping::{
    ColumnMapping, MappedRow, TargetFieldDescriptor, SKIP_DESCRIPTOR, SKIP_FIELD,
};
pub use record::{
    BlockKind, CustomerCompany, CustomerPerson, Game, GpsPoint, Invoice, InvoiceStatus,
    MappedRecord, NaturalKey, Order, Performance, RichTextBlock,
};
pub use table::{ColumnStats, ParseDiagnostic, ParsedTable, RawRow};
pub use types::{EntityType, InferredType, RowStatus, Severity};
pub use validation::{
    DuplicateGroup, ExistingMatch, FieldIssue, MappingIssue, MappingIssueKind, ValidationOutcome,
};
