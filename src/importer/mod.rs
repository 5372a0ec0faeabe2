// ==========================================
// CSV 导入核心 - 导入层
// ==========================================
// 职责: 源文本 → 网格 → 字段代码记录 → 防重过滤 → 提交
// 支持: 分隔文本（CSV 等），已解码为 UTF-8 字符串
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod error;
pub mod error_report;
pub mod field_mapper;
pub mod file_parser;
pub mod import_coordinator;
pub mod import_trait;

// 重导出核心类型
pub use conflict_handler::{GuardValueSet, LotGuard, LotGuardFilter};
pub use error::{ImportError, ImportErrorKind, ImportResult};
pub use error_report::{
    compose_submission_error, retrieve_errors, submission_lead, DEFAULT_MAX_ERROR_MESSAGES,
};
pub use field_mapper::HeaderRecordMapper;
pub use file_parser::{DelimitedTextParser, Grid, ParserOptions};
pub use import_coordinator::{import_all, ImportCoordinator};

// 重导出 Trait 接口
pub use import_trait::{ConflictHandler, FieldMapper, FileParser, Importer};
