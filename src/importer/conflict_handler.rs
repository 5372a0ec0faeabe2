// ==========================================
// CSV 导入核心 - 批次防重 (Lot Guard)
// ==========================================
// 职责: 排除防重字段值已存在于目标应用的记录
// 未启用防重时为原样透传
// ==========================================

use crate::domain::{FieldSchema, ImportRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::ConflictHandler;
use crate::repository::FieldValue;
use std::collections::HashSet;
use tracing::debug;

// ==========================================
// GuardValueSet - 目标应用中已存在的防重字段值
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardValueSet {
    values: HashSet<String>,
}

impl GuardValueSet {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for GuardValueSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ==========================================
// LotGuard - 防重字段 + 已存在值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotGuard {
    pub field_code: String,
    pub values: GuardValueSet,
}

impl LotGuard {
    pub fn new(field_code: impl Into<String>, values: GuardValueSet) -> Self {
        Self {
            field_code: field_code.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LotGuardFilter;

impl ConflictHandler for LotGuardFilter {
    fn unique_values(&self, remote_values: &[FieldValue], guard_field: &str) -> GuardValueSet {
        let values: GuardValueSet = remote_values
            .iter()
            .filter(|v| !v.value.is_empty())
            .map(|v| v.value.as_str())
            .collect();

        debug!(
            guard_field = %guard_field,
            fetched = remote_values.len(),
            unique = values.len(),
            "防重字段已存在值整理完成"
        );
        values
    }

    fn filter(
        &self,
        records: Vec<ImportRecord>,
        guard: Option<&LotGuard>,
        schema: &FieldSchema,
        target: &str,
    ) -> ImportResult<Vec<ImportRecord>> {
        let Some(guard) = guard else {
            return Ok(records);
        };

        if let Some(first) = records.first() {
            if !first.contains_field(&guard.field_code) {
                return Err(ImportError::GuardFieldMissing {
                    target: target.to_string(),
                    label: schema
                        .label_of(&guard.field_code)
                        .unwrap_or_default()
                        .to_string(),
                    code: guard.field_code.clone(),
                });
            }
        }

        let before = records.len();
        let kept: Vec<ImportRecord> = records
            .into_iter()
            .filter(|record| match record.value(&guard.field_code) {
                Some(value) => !guard.values.contains(value),
                None => true,
            })
            .collect();

        debug!(
            guard_field = %guard.field_code,
            before,
            kept = kept.len(),
            "批次防重过滤完成"
        );
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldProperty;

    fn schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldProperty::new("lot_no", "批次号", "SINGLE_LINE_TEXT"),
            FieldProperty::new("qty", "数量", "NUMBER"),
        ])
    }

    fn records(lots: &[&str]) -> Vec<ImportRecord> {
        lots.iter()
            .enumerate()
            .map(|(idx, lot)| ImportRecord::new(idx + 1).with("lot_no", lot))
            .collect()
    }

    #[test]
    fn test_unique_values_skips_empty() {
        let remote = vec![
            FieldValue::new("1", "X"),
            FieldValue::new("2", ""),
            FieldValue::new("3", "X"),
            FieldValue::new("4", "Y"),
        ];
        let values = LotGuardFilter.unique_values(&remote, "lot_no");

        assert_eq!(values.len(), 2);
        assert!(values.contains("X"));
        assert!(values.contains("Y"));
        assert!(!values.contains(""));
    }

    #[test]
    fn test_filter_keeps_order() {
        let guard = LotGuard::new("lot_no", ["X"].into_iter().collect());
        let kept = LotGuardFilter
            .filter(records(&["X", "Y", "X", "Z"]), Some(&guard), &schema(), "100")
            .unwrap();

        let lots: Vec<&str> = kept.iter().filter_map(|r| r.value("lot_no")).collect();
        assert_eq!(lots, vec!["Y", "Z"]);
        assert_eq!(kept[0].row_number, 2);
        assert_eq!(kept[1].row_number, 4);
    }

    #[test]
    fn test_filter_disabled_is_pass_through() {
        let input = vec![ImportRecord::new(1).with("qty", "1")];
        let kept = LotGuardFilter
            .filter(input.clone(), None, &schema(), "100")
            .unwrap();
        assert_eq!(kept, input);
    }

    #[test]
    fn test_filter_missing_guard_field() {
        let guard = LotGuard::new("lot_no", GuardValueSet::default());
        let input = vec![ImportRecord::new(1).with("qty", "1")];
        let err = LotGuardFilter
            .filter(input, Some(&guard), &schema(), "100")
            .unwrap_err();

        match err {
            ImportError::GuardFieldMissing { target, label, code } => {
                assert_eq!(target, "100");
                assert_eq!(label, "批次号");
                assert_eq!(code, "lot_no");
            }
            other => panic!("应为 GuardFieldMissing: {:?}", other),
        }
    }

    #[test]
    fn test_filter_empty_records() {
        let guard = LotGuard::new("lot_no", ["X"].into_iter().collect());
        let kept = LotGuardFilter
            .filter(Vec::new(), Some(&guard), &schema(), "100")
            .unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_filter_keeps_missing_values() {
        let guard = LotGuard::new("lot_no", ["X"].into_iter().collect());
        let mut record = ImportRecord::new(1);
        record.fields.insert("lot_no".to_string(), None);

        let kept = LotGuardFilter
            .filter(vec![record], Some(&guard), &schema(), "100")
            .unwrap();
        assert_eq!(kept.len(), 1);
    }
}
