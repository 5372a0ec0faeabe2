// ==========================================
// CSV 导入核心 - 目标字段定义 (FieldSchema)
// ==========================================
// 职责: 字段代码 → {字段名, 类型, 是否唯一}
// 生命周期: 每次导入运行获取一次，运行期间不变
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 记录编号字段类型
pub const RECORD_NUMBER_TYPE: &str = "RECORD_NUMBER";

/// 可作为批次防重判定字段的类型
pub const GUARD_FIELD_TYPES: [&str; 3] = ["DATE", "SINGLE_LINE_TEXT", "NUMBER"];

// ==========================================
// FieldProperty - 单个字段定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProperty {
    pub code: String,       // 字段代码
    pub label: String,      // 字段名（显示用）
    #[serde(rename = "type")]
    pub field_type: String, // 字段类型（SINGLE_LINE_TEXT / NUMBER / DATE ...）
    #[serde(default)]
    pub unique: bool,       // 是否禁止重复
}

impl FieldProperty {
    pub fn new(code: &str, label: &str, field_type: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            field_type: field_type.to_string(),
            unique: false,
        }
    }

    /// 标记为禁止重复
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

// ==========================================
// FieldSchema - 目标应用的字段定义集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    properties: BTreeMap<String, FieldProperty>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldProperty>) -> Self {
        let properties = fields
            .into_iter()
            .map(|field| (field.code.clone(), field))
            .collect();
        Self { properties }
    }

    pub fn get(&self, code: &str) -> Option<&FieldProperty> {
        self.properties.get(code)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.properties.contains_key(code)
    }

    /// 字段代码对应的字段名
    pub fn label_of(&self, code: &str) -> Option<&str> {
        self.properties.get(code).map(|p| p.label.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldProperty> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// 字段名 → 字段代码 列表
    ///
    /// 同名字段会出现多个代码，由调用方判定歧义
    pub fn codes_by_label(&self) -> HashMap<&str, Vec<&str>> {
        let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
        for field in self.properties.values() {
            index
                .entry(field.label.as_str())
                .or_default()
                .push(field.code.as_str());
        }
        index
    }

    /// 被多个字段使用的字段名（去重、排序）
    pub fn duplicated_labels(&self) -> Vec<String> {
        let labels: Vec<&str> = self.fields().map(|f| f.label.as_str()).collect();
        overlapped(&labels)
            .into_iter()
            .map(|label| label.to_string())
            .collect()
    }

    /// 禁止重复的字段
    ///
    /// # 参数
    /// - with_record_number: 是否包含记录编号字段
    pub fn unique_fields(&self, with_record_number: bool) -> Vec<&FieldProperty> {
        self.fields()
            .filter(|f| f.unique || (with_record_number && f.field_type == RECORD_NUMBER_TYPE))
            .collect()
    }

    /// 可作为防重判定字段的候选
    pub fn guard_candidates(&self) -> Vec<&FieldProperty> {
        self.fields()
            .filter(|f| GUARD_FIELD_TYPES.contains(&f.field_type.as_str()))
            .collect()
    }
}

/// 列表中出现超过一次的元素（去重、升序）
pub fn overlapped<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort();

    let mut result: Vec<T> = Vec::new();
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] && result.last() != Some(&pair[0]) {
            result.push(pair[0].clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldProperty::new("lot_no", "批次号", "SINGLE_LINE_TEXT").unique(),
            FieldProperty::new("qty", "数量", "NUMBER"),
            FieldProperty::new("memo", "备注", "MULTI_LINE_TEXT"),
            FieldProperty::new("memo2", "备注", "MULTI_LINE_TEXT"),
            FieldProperty::new("record_no", "记录编号", RECORD_NUMBER_TYPE),
        ])
    }

    #[test]
    fn test_label_of() {
        let schema = sample_schema();
        assert_eq!(schema.label_of("lot_no"), Some("批次号"));
        assert_eq!(schema.label_of("missing"), None);
        assert_eq!(schema.len(), 5);
    }

    #[test]
    fn test_duplicated_labels() {
        let schema = sample_schema();
        assert_eq!(schema.duplicated_labels(), vec!["备注".to_string()]);
    }

    #[test]
    fn test_unique_fields() {
        let schema = sample_schema();

        let codes: Vec<&str> = schema.unique_fields(false).iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["lot_no"]);

        let codes: Vec<&str> = schema.unique_fields(true).iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["lot_no", "record_no"]);
    }

    #[test]
    fn test_guard_candidates() {
        let schema = sample_schema();
        let codes: Vec<&str> = schema.guard_candidates().iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["lot_no", "qty"]);
    }

    #[test]
    fn test_overlapped() {
        assert_eq!(overlapped(&[1, 2, 3, 2, 1, 2]), vec![1, 2]);
        assert!(overlapped::<i32>(&[]).is_empty());
        assert!(overlapped(&["a", "b"]).is_empty());
    }

    #[test]
    fn test_deserialize_field_property() {
        let json = r#"{"code":"lot_no","label":"批次号","type":"SINGLE_LINE_TEXT"}"#;
        let field: FieldProperty = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, "SINGLE_LINE_TEXT");
        assert!(!field.unique);
    }
}
