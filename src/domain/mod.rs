// ==========================================
// CSV 导入核心 - 领域模型层
// ==========================================
// 职责: 定义导入管道的数据结构与类型
// 红线: 不含数据访问逻辑，不含管道编排逻辑
// ==========================================

pub mod record;
pub mod schema;
pub mod types;

// 重导出核心类型
pub use record::{
    FileImportOutcome, HeaderRecord, HeaderTable, ImportRecord, ImportSummary, SourceText,
    SummaryKind,
};
pub use schema::{FieldProperty, FieldSchema};
pub use types::{HeaderMode, ImportStage};
