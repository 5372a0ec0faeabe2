// ==========================================
// CSV 导入核心 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 分隔文本 → 目标应用记录的批量导入（含批次防重）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 类型与数据结构
pub mod domain;

// 记录库层 - 目标应用访问
pub mod repository;

// 导入层 - 解析、映射、防重、提交
pub mod importer;

// 配置层 - 导入设置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    FieldProperty, FieldSchema, FileImportOutcome, HeaderMode, ImportRecord, ImportStage,
    ImportSummary, SourceText, SummaryKind,
};

// 导入
pub use importer::{
    import_all, DelimitedTextParser, Grid, ImportCoordinator, ImportError, ImportResult,
    Importer,
};

// 记录库
pub use repository::{RemoteStore, RepositoryError, SqliteRecordStore};

// 配置
pub use config::{ConfigManager, ImportConfigReader, ImportSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "lot-guard-import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
