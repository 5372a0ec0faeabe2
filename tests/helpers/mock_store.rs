// ==========================================
// Mock 记录库实现 - 用于集成测试
// ==========================================
// 记录调用顺序，可注入通信失败与校验失败
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use lot_guard_import::domain::{FieldSchema, ImportRecord};
use lot_guard_import::repository::{
    FieldValidationErrors, FieldValue, RemoteStore, RepositoryError, RepositoryResult,
};
use std::sync::{Arc, Mutex};

/// 记录库调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetFieldSchema,
    GetAllValues(String),
    SubmitRecords(usize),
}

/// 注入的失败
#[derive(Debug, Clone)]
pub enum Failure {
    Transport(String),
    Validation(FieldValidationErrors),
}

impl Failure {
    fn into_error(self) -> RepositoryError {
        match self {
            Failure::Transport(message) => RepositoryError::Transport(message),
            Failure::Validation(errors) => RepositoryError::Validation(errors),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    schema: FieldSchema,
    values: Vec<FieldValue>,
    calls: Vec<StoreCall>,
    submitted: Vec<Vec<ImportRecord>>,
    schema_failure: Option<Failure>,
    values_failure: Option<Failure>,
    submit_failure: Option<Failure>,
    omit_record_ids: bool,
    next_id: usize,
}

/// Mock 记录库（Clone 共享同一状态）
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<MockState>>,
}

impl MockStore {
    pub fn new(schema: FieldSchema) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().schema = schema;
        store
    }

    /// 设置防重字段的已存在值
    pub fn with_values(self, values: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.values = values
                .iter()
                .enumerate()
                .map(|(idx, v)| FieldValue::new((idx + 1).to_string(), *v))
                .collect();
        }
        self
    }

    pub fn fail_schema(&self, failure: Failure) {
        self.state.lock().unwrap().schema_failure = Some(failure);
    }

    pub fn fail_values(&self, failure: Failure) {
        self.state.lock().unwrap().values_failure = Some(failure);
    }

    pub fn fail_submit(&self, failure: Failure) {
        self.state.lock().unwrap().submit_failure = Some(failure);
    }

    /// 提交成功但不返回记录 ID
    pub fn omit_record_ids(&self) {
        self.state.lock().unwrap().omit_record_ids = true;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// 每次提交的记录（按提交顺序）
    pub fn submitted(&self) -> Vec<Vec<ImportRecord>> {
        self.state.lock().unwrap().submitted.clone()
    }
}

#[async_trait]
impl RemoteStore for MockStore {
    async fn get_field_schema(&self, _target: &str) -> RepositoryResult<FieldSchema> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::GetFieldSchema);
        if let Some(failure) = state.schema_failure.take() {
            return Err(failure.into_error());
        }
        Ok(state.schema.clone())
    }

    async fn get_all_values(&self, _target: &str, field: &str) -> RepositoryResult<Vec<FieldValue>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::GetAllValues(field.to_string()));
        if let Some(failure) = state.values_failure.take() {
            return Err(failure.into_error());
        }
        Ok(state.values.clone())
    }

    async fn submit_records(
        &self,
        _target: &str,
        records: &[ImportRecord],
    ) -> RepositoryResult<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::SubmitRecords(records.len()));
        if let Some(failure) = state.submit_failure.take() {
            return Err(failure.into_error());
        }

        state.submitted.push(records.to_vec());
        if state.omit_record_ids {
            return Ok(Vec::new());
        }

        let start = state.next_id;
        state.next_id += records.len();
        Ok((start..state.next_id).map(|id| (id + 1).to_string()).collect())
    }
}
