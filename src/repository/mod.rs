// ==========================================
// CSV 导入核心 - 记录库层
// ==========================================
// 职责: 目标记录库的访问接口与本地实现
// 红线: Repository 不含导入规则，只做数据读写
// ==========================================

pub mod error;
pub mod remote_store;
pub mod sqlite_store;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use remote_store::{FieldValidationErrors, FieldValue, RemoteStore};
pub use sqlite_store::{SqliteRecordStore, StoredRecord};
