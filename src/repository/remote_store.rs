// ==========================================
// CSV 导入核心 - 记录库接口 (RemoteStore)
// ==========================================
// 职责: 定义导入管道访问目标记录库的接口（不包含实现）
// 红线: 只做数据读写，不含导入规则
// ==========================================

use crate::domain::{FieldSchema, ImportRecord};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ==========================================
// FieldValue - 单条已存在记录的字段值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub record_id: String,
    pub value: String, // 未填写时为空字符串
}

impl FieldValue {
    pub fn new(record_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            value: value.into(),
        }
    }
}

// ==========================================
// FieldValidationErrors - 字段级校验错误
// ==========================================
// 键: 出错位置（如 records[3].lot_no）
// 值: 该位置的一条或多条消息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl FieldValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 消息总数
    pub fn message_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

impl fmt::Display for FieldValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 个字段共 {} 条校验错误",
            self.errors.len(),
            self.message_count()
        )
    }
}

// ==========================================
// RemoteStore Trait
// ==========================================
// 实现者: SqliteRecordStore；测试中为脚本化 Mock
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// 获取目标应用的字段定义
    ///
    /// # 返回
    /// - Err(TargetNotFound): 应用不存在或无访问权限
    async fn get_field_schema(&self, target: &str) -> RepositoryResult<FieldSchema>;

    /// 获取目标应用全部记录中指定字段的值
    ///
    /// # 返回
    /// - Ok(Vec<FieldValue>): (记录 ID, 值) 列表
    async fn get_all_values(&self, target: &str, field: &str) -> RepositoryResult<Vec<FieldValue>>;

    /// 批量提交记录
    ///
    /// # 返回
    /// - Ok(Vec<String>): 新记录 ID（与输入顺序一致）
    /// - Err(Validation): 字段级校验错误，整批未写入
    async fn submit_records(
        &self,
        target: &str,
        records: &[ImportRecord],
    ) -> RepositoryResult<Vec<String>>;
}

#[async_trait]
impl<T> RemoteStore for Arc<T>
where
    T: RemoteStore + ?Sized,
{
    async fn get_field_schema(&self, target: &str) -> RepositoryResult<FieldSchema> {
        (**self).get_field_schema(target).await
    }

    async fn get_all_values(&self, target: &str, field: &str) -> RepositoryResult<Vec<FieldValue>> {
        (**self).get_all_values(target, field).await
    }

    async fn submit_records(
        &self,
        target: &str,
        records: &[ImportRecord],
    ) -> RepositoryResult<Vec<String>> {
        (**self).submit_records(target, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_validation_errors_count() {
        let mut errors = FieldValidationErrors::new();
        assert!(errors.is_empty());

        errors.push("records[0].lot_no", "值重复");
        errors.push("records[0].lot_no", "必填");
        errors.push("records[1].qty", "不是数字");

        assert_eq!(errors.errors.len(), 2);
        assert_eq!(errors.message_count(), 3);
        assert_eq!(errors.to_string(), "2 个字段共 3 条校验错误");
    }
}
