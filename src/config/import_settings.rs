// ==========================================
// CSV 导入核心 - 导入设置
// ==========================================
// 职责: 一次导入运行所需的全部设置（目标应用、表头方式、防重）
// ==========================================

use crate::domain::{FieldSchema, HeaderMode};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::error_report::DEFAULT_MAX_ERROR_MESSAGES;
use serde::{Deserialize, Serialize};

fn default_max_error_messages() -> usize {
    DEFAULT_MAX_ERROR_MESSAGES
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub target_id: String,          // 导入目标应用
    pub header_mode: HeaderMode,    // 表头解释方式
    pub lot_guard_enabled: bool,    // 是否启用批次防重
    #[serde(default)]
    pub guard_field: String,        // 防重判定字段代码
    #[serde(default = "default_max_error_messages")]
    pub max_error_messages: usize,  // 提交失败时最多展示的错误条数
}

impl ImportSettings {
    /// 默认不启用防重
    pub fn new(target_id: impl Into<String>, header_mode: HeaderMode) -> Self {
        Self {
            target_id: target_id.into(),
            header_mode,
            lot_guard_enabled: false,
            guard_field: String::new(),
            max_error_messages: DEFAULT_MAX_ERROR_MESSAGES,
        }
    }

    pub fn with_lot_guard(mut self, guard_field: impl Into<String>) -> Self {
        self.lot_guard_enabled = true;
        self.guard_field = guard_field.into();
        self
    }

    pub fn with_max_error_messages(mut self, max_error_messages: usize) -> Self {
        self.max_error_messages = max_error_messages;
        self
    }

    /// 防重字段（未启用时为 None）
    pub fn guard_field(&self) -> Option<&str> {
        self.lot_guard_enabled.then_some(self.guard_field.as_str())
    }

    /// 自身一致性校验
    pub fn validate(&self) -> ImportResult<()> {
        if self.target_id.trim().is_empty() {
            return Err(ImportError::ConfigValueError {
                key: "target_id".to_string(),
                value: self.target_id.clone(),
                message: "未指定导入目标应用".to_string(),
            });
        }

        if self.lot_guard_enabled && self.guard_field.trim().is_empty() {
            return Err(ImportError::ConfigValueError {
                key: "guard_field".to_string(),
                value: self.guard_field.clone(),
                message: "已启用批次防重，但未指定判定字段".to_string(),
            });
        }

        Ok(())
    }

    /// 与目标应用字段定义的一致性校验（取得 FieldSchema 后调用）
    pub fn validate_against_schema(&self, schema: &FieldSchema) -> ImportResult<()> {
        if let Some(code) = self.guard_field() {
            if !schema.contains_code(code) {
                return Err(ImportError::GuardFieldNotInSchema {
                    target: self.target_id.clone(),
                    code: code.to_string(),
                });
            }
        }
        Ok(())
    }
}
