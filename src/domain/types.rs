// ==========================================
// CSV 导入核心 - 领域类型定义
// ==========================================
// 职责: 表头解释方式、导入阶段
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 表头解释方式 (Header Mode)
// ==========================================
// BY_NAME: 表头为字段名（需经 FieldSchema 转换为字段代码）
// BY_CODE: 表头即字段代码（不做转换）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderMode {
    ByName,
    ByCode,
}

impl HeaderMode {
    /// 设置画面上显示的标签
    pub fn label(&self) -> &'static str {
        match self {
            HeaderMode::ByName => "字段名",
            HeaderMode::ByCode => "字段代码",
        }
    }

    /// 从设置值解析（接受 BY_NAME/BY_CODE 及显示标签）
    ///
    /// # 返回
    /// - None: 无法识别
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        match normalized.to_ascii_uppercase().as_str() {
            "BY_NAME" | "NAME" => return Some(HeaderMode::ByName),
            "BY_CODE" | "CODE" => return Some(HeaderMode::ByCode),
            _ => {}
        }

        match normalized {
            "字段名" => Some(HeaderMode::ByName),
            "字段代码" => Some(HeaderMode::ByCode),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderMode::ByName => write!(f, "BY_NAME"),
            HeaderMode::ByCode => write!(f, "BY_CODE"),
        }
    }
}

// ==========================================
// 导入阶段 (Import Stage)
// ==========================================
// FETCH_SCHEMA → FETCH_GUARD_VALUES → PARSE → MAP_HEADERS → FILTER → SUBMIT → DONE
// 任一阶段失败 → FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    FetchSchema,
    FetchGuardValues,
    Parse,
    MapHeaders,
    Filter,
    Submit,
    Done,
    Failed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::FetchSchema => "FETCH_SCHEMA",
            ImportStage::FetchGuardValues => "FETCH_GUARD_VALUES",
            ImportStage::Parse => "PARSE",
            ImportStage::MapHeaders => "MAP_HEADERS",
            ImportStage::Filter => "FILTER",
            ImportStage::Submit => "SUBMIT",
            ImportStage::Done => "DONE",
            ImportStage::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}
