// ==========================================
// CSV 导入核心 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 消息已为可直接展示给操作员的格式
// ==========================================

use crate::domain::ImportStage;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 配置错误 =====
    #[error(
        "[错误] 请检查批次防重设置或 CSV 文件。\n\n目标应用 {target} 的『字段名: [{label}] / 字段代码: [{code}]』在 CSV 中没有对应的列。"
    )]
    GuardFieldMissing {
        target: String,
        label: String,
        code: String,
    },

    #[error("批次防重判定字段 [{code}] 不存在于目标应用 {target}")]
    GuardFieldNotInSchema { target: String, code: String },

    #[error("CSV 表头解释方式无法识别: [{0}]。重新保存插件设置可能会解决此问题。")]
    HeaderModeInvalid(String),

    #[error("批次防重选项无法识别: [{0}]。重新保存插件设置可能会解决此问题。")]
    LotGuardOptionInvalid(String),

    #[error("配置项缺失 (key: {key})")]
    ConfigMissing { key: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置文件读取失败: {0}")]
    ConfigFileError(String),

    // ===== 表头映射错误 =====
    #[error("CSV 表头 [{label}] 在目标应用 {target} 中没有对应的字段")]
    SchemaMismatch { target: String, label: String },

    #[error("CSV 表头 [{label}] 对应目标应用 {target} 中的多个同名字段 {codes:?}，无法确定字段代码")]
    AmbiguousLabel {
        target: String,
        label: String,
        codes: Vec<String>,
    },

    #[error("CSV 中有多个列对应同一字段代码 [{field_code}]")]
    HeaderCollision { field_code: String },

    #[error("第 {row} 条数据行第 {column} 列的值 [{value}] 超出表头范围，没有对应的字段")]
    CellOutsideHeader {
        row: usize,
        column: usize,
        value: String,
    },

    // ===== 解析错误 =====
    #[error("CSV 为空（没有表头行）: {file}")]
    EmptySource { file: String },

    #[error("指定了范围外的单元格 (x: {x} / y: {y})")]
    OutOfRange { x: usize, y: usize },

    // ===== 提交错误 =====
    #[error("{}", .lines.join("\n"))]
    Submission {
        target: String,
        file: Option<String>,
        lines: Vec<String>,
    },

    // ===== 通信错误 =====
    #[error("{stage} 阶段访问目标应用 {target} 失败: {source}")]
    Transport {
        stage: ImportStage,
        target: String,
        #[source]
        source: RepositoryError,
    },

    // ===== 上下文 =====
    #[error("文件 [{file}]: {source}")]
    InFile {
        file: String,
        #[source]
        source: Box<ImportError>,
    },
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    Configuration,
    SchemaMismatch,
    Parse,
    RemoteSubmission,
    RemoteTransport,
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::GuardFieldMissing { .. }
            | ImportError::GuardFieldNotInSchema { .. }
            | ImportError::HeaderModeInvalid(_)
            | ImportError::LotGuardOptionInvalid(_)
            | ImportError::ConfigMissing { .. }
            | ImportError::ConfigValueError { .. }
            | ImportError::ConfigFileError(_) => ImportErrorKind::Configuration,
            ImportError::SchemaMismatch { .. }
            | ImportError::AmbiguousLabel { .. }
            | ImportError::HeaderCollision { .. }
            | ImportError::CellOutsideHeader { .. } => ImportErrorKind::SchemaMismatch,
            ImportError::EmptySource { .. } | ImportError::OutOfRange { .. } => {
                ImportErrorKind::Parse
            }
            ImportError::Submission { .. } => ImportErrorKind::RemoteSubmission,
            ImportError::Transport { .. } => ImportErrorKind::RemoteTransport,
            ImportError::InFile { source, .. } => source.kind(),
        }
    }

    /// 附加源文件名上下文
    ///
    /// 文件名为空，或消息中已包含文件名时原样返回
    pub fn in_file(self, file: &str) -> Self {
        if file.is_empty() {
            return self;
        }

        match self {
            ImportError::EmptySource { file: current } if current.is_empty() => {
                ImportError::EmptySource {
                    file: file.to_string(),
                }
            }
            ImportError::InFile { .. }
            | ImportError::EmptySource { .. }
            | ImportError::Submission { file: Some(_), .. } => self,
            other => ImportError::InFile {
                file: file.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// 去掉上下文包装后的原始错误
    pub fn root(&self) -> &ImportError {
        match self {
            ImportError::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::ConfigFileError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigFileError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_file_wraps_once() {
        let err = ImportError::SchemaMismatch {
            target: "100".to_string(),
            label: "数量".to_string(),
        }
        .in_file("a.csv")
        .in_file("b.csv");

        assert_eq!(err.kind(), ImportErrorKind::SchemaMismatch);
        assert_eq!(
            err.to_string(),
            "文件 [a.csv]: CSV 表头 [数量] 在目标应用 100 中没有对应的字段"
        );
        assert!(matches!(err.root(), ImportError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_in_file_skips_empty_name() {
        let err = ImportError::HeaderModeInvalid("x".to_string()).in_file("");
        assert!(matches!(err, ImportError::HeaderModeInvalid(_)));
    }

    #[test]
    fn test_in_file_names_empty_source() {
        let err = ImportError::EmptySource { file: String::new() }.in_file("a.csv");
        assert_eq!(err.to_string(), "CSV 为空（没有表头行）: a.csv");
    }

    #[test]
    fn test_submission_display_joins_lines() {
        let err = ImportError::Submission {
            target: "100".to_string(),
            file: Some("a.csv".to_string()),
            lines: vec!["lead".to_string(), "[f] m".to_string()],
        };
        assert_eq!(err.to_string(), "lead\n[f] m");
        assert!(matches!(err.in_file("a.csv"), ImportError::Submission { .. }));
    }

    #[test]
    fn test_transport_kind() {
        let err = ImportError::Transport {
            stage: ImportStage::FetchSchema,
            target: "100".to_string(),
            source: RepositoryError::TargetNotFound {
                target: "100".to_string(),
            },
        };
        assert_eq!(err.kind(), ImportErrorKind::RemoteTransport);
        assert!(err.to_string().starts_with("FETCH_SCHEMA 阶段访问目标应用 100 失败"));
    }
}
