// ==========================================
// CSV 导入核心 - 记录库错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::remote_store::FieldValidationErrors;
use thiserror::Error;

/// 记录库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 目标相关错误 =====
    #[error("目标应用不存在或无访问权限: {target}")]
    TargetNotFound { target: String },

    #[error("字段不存在 (target={target}, field={field})")]
    FieldNotFound { target: String, field: String },

    // ===== 提交校验错误 =====
    #[error("记录校验失败: {0}")]
    Validation(FieldValidationErrors),

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("记录库版本 {found} 高于当前程序支持的版本 {expected}")]
    SchemaVersionMismatch { found: i64, expected: i64 },

    #[error("序列化失败: {0}")]
    SerializationError(String),

    // ===== 通信错误 =====
    #[error("通信失败: {0}")]
    Transport(String),
}

impl RepositoryError {
    /// 字段级校验错误（若有）
    pub fn validation_errors(&self) -> Option<&FieldValidationErrors> {
        match self {
            RepositoryError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
