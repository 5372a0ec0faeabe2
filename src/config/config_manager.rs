// ==========================================
// CSV 导入核心 - 配置管理器
// ==========================================
// 职责: 插件式 key/value 设置的加载与类型化读取
// 存储: 字符串键值对（可来自 JSON 文件）
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::HeaderMode;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::error_report::DEFAULT_MAX_ERROR_MESSAGES;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 配置键
pub mod config_keys {
    pub const IMPORT_APP: &str = "import_app";
    pub const HEADER_HANDLING: &str = "header_handling";
    pub const LOTGUARD: &str = "lotguard";
    pub const LOTGUARD_FIELD: &str = "lotguard_field";
    pub const MAX_ERROR_MESSAGES: &str = "max_error_messages";
}

/// 下拉框未选择状态
pub const UNSELECTED_OPTION: &str = "----";

/// 批次防重选项
pub const LOTGUARD_ON: &str = "on";
pub const LOTGUARD_OFF: &str = "off";

/// 解析批次防重选项
///
/// # 返回
/// - "on" → true / "off" → false
/// - 其他 → LotGuardOptionInvalid
pub fn parse_lot_guard_option(value: &str) -> ImportResult<bool> {
    match value.trim() {
        LOTGUARD_ON => Ok(true),
        LOTGUARD_OFF => Ok(false),
        other => Err(ImportError::LotGuardOptionInvalid(other.to_string())),
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 从 JSON 对象字符串加载（值必须为字符串）
    pub fn from_json_str(json: &str) -> ImportResult<Self> {
        let values: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { values })
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ImportError::ConfigFileError(format!("{}: {}", path.display(), e))
        })?;
        let manager = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), keys = manager.values.len(), "配置文件加载完成");
        Ok(manager)
    }

    /// 读取配置值（未设置或未选择时返回 None）
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && *v != UNSELECTED_OPTION)
    }

    fn require(&self, key: &str) -> ImportResult<&str> {
        self.get_config_value(key)
            .ok_or_else(|| ImportError::ConfigMissing {
                key: key.to_string(),
            })
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_target_id(&self) -> ImportResult<String> {
        self.require(config_keys::IMPORT_APP).map(str::to_string)
    }

    fn get_header_mode(&self) -> ImportResult<HeaderMode> {
        let raw = self.require(config_keys::HEADER_HANDLING)?;
        HeaderMode::parse(raw).ok_or_else(|| ImportError::HeaderModeInvalid(raw.to_string()))
    }

    fn is_lot_guard_enabled(&self) -> ImportResult<bool> {
        parse_lot_guard_option(self.require(config_keys::LOTGUARD)?)
    }

    fn get_guard_field(&self) -> ImportResult<String> {
        Ok(self
            .get_config_value(config_keys::LOTGUARD_FIELD)
            .unwrap_or_default()
            .to_string())
    }

    fn get_max_error_messages(&self) -> ImportResult<usize> {
        match self.get_config_value(config_keys::MAX_ERROR_MESSAGES) {
            None => Ok(DEFAULT_MAX_ERROR_MESSAGES),
            Some(raw) => raw.parse::<usize>().map_err(|e| ImportError::ConfigValueError {
                key: config_keys::MAX_ERROR_MESSAGES.to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
