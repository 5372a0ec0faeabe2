// ==========================================
// CSV 导入核心 - 记录与导入结果
// ==========================================
// 职责: 定义导入管道中流转的数据结构
// 生命周期: 每个源文件新建，提交后丢弃
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

// ==========================================
// SourceText - 已解码的源文件文本
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub file_name: String, // 源文件名（可为空）
    pub text: String,      // 已解码的文本
}

impl SourceText {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

// ==========================================
// HeaderRecord - 以表头为键的数据行
// ==========================================
// 每个表头键都必须出现；缺失的单元格用 None 显式表示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub row_number: usize,                      // 源文件中的数据行号（从 1 开始，不含表头）
    pub fields: Vec<(String, Option<String>)>,  // (表头, 值)，保持表头顺序
}

impl HeaderRecord {
    pub fn get(&self, header: &str) -> Option<&Option<String>> {
        self.fields
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value)
    }
}

// ==========================================
// HeaderTable - 表头 + 数据行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTable {
    pub headers: Vec<String>,
    pub records: Vec<HeaderRecord>,
}

// ==========================================
// ImportRecord - 字段代码 → 值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub row_number: usize,
    pub fields: BTreeMap<String, Option<String>>,
}

impl ImportRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            fields: BTreeMap::new(),
        }
    }

    /// 追加字段（链式构造，测试用途居多）
    pub fn with(mut self, code: &str, value: &str) -> Self {
        self.fields.insert(code.to_string(), Some(value.to_string()));
        self
    }

    pub fn contains_field(&self, code: &str) -> bool {
        self.fields.contains_key(code)
    }

    /// 字段值（字段缺失或值缺失均返回 None）
    pub fn value(&self, code: &str) -> Option<&str> {
        self.fields.get(code).and_then(|v| v.as_deref())
    }
}

// ==========================================
// FileImportOutcome - 单个源文件的导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileImportOutcome {
    pub file_name: String,
    pub source_rows: usize,      // 源文件数据行数（不含表头）
    pub skipped_by_guard: usize, // 被批次防重排除的行数
    pub submitted: usize,        // 提交成功的记录数
    pub record_ids: Vec<String>, // 目标端分配的记录 ID
}

// ==========================================
// SummaryKind - 汇总结果分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryKind {
    Imported,           // 至少导入 1 条
    AllFilteredByGuard, // 批次防重过滤后为 0 条
    NoSourceRecords,    // 源文件中没有记录
}

// ==========================================
// ImportSummary - 一次导入运行的汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub target_id: String,
    pub lot_guard_enabled: bool,
    pub files: Vec<FileImportOutcome>, // 按输入顺序
    pub total_imported: usize,
    pub imported_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ImportSummary {
    pub fn kind(&self) -> SummaryKind {
        if self.total_imported > 0 {
            return SummaryKind::Imported;
        }

        let filtered = self.files.iter().any(|f| f.skipped_by_guard > 0);
        if self.lot_guard_enabled && filtered {
            SummaryKind::AllFilteredByGuard
        } else {
            SummaryKind::NoSourceRecords
        }
    }

    /// 面向操作员的结果消息
    pub fn message(&self) -> String {
        match self.kind() {
            SummaryKind::Imported => format!(
                "{} 个 CSV 文件，共 {} 条记录已导入应用 {}。",
                self.files.len(),
                self.total_imported,
                self.target_id
            ),
            SummaryKind::AllFilteredByGuard => {
                "批次防重过滤后，导入对象记录为 0 条。".to_string()
            }
            SummaryKind::NoSourceRecords => "CSV 中没有可导入的记录。".to_string(),
        }
    }
}
