// ==========================================
// CSV 导入核心 - 本地记录库实现 (SQLite)
// ==========================================
// 职责: 以 SQLite 实现 RemoteStore（字段定义 + 记录 JSON）
// 红线: 批量提交整批校验，任一错误则整批不写入
// ==========================================

use crate::db::{
    configure_sqlite_connection, init_schema, open_sqlite_connection, read_schema_version,
    CURRENT_SCHEMA_VERSION,
};
use crate::domain::schema::FieldProperty;
use crate::domain::{FieldSchema, ImportRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::remote_store::{FieldValidationErrors, FieldValue, RemoteStore};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

// ==========================================
// StoredRecord - 已写入的记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record_id: String,
    pub fields: BTreeMap<String, String>,
}

impl StoredRecord {
    pub fn value(&self, code: &str) -> Option<&str> {
        self.fields.get(code).map(String::as_str)
    }
}

// ==========================================
// SqliteRecordStore
// ==========================================
// Clone 共享同一连接
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 打开（或新建）本地记录库
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::prepare(conn)
    }

    /// 内存库（测试/试运行）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_sqlite_connection(&conn)?;
        Self::prepare(conn)
    }

    /// 建表并检查 schema_version（不接受比当前代码更新的库）
    fn prepare(conn: Connection) -> RepositoryResult<Self> {
        init_schema(&conn)?;

        if let Some(found) = read_schema_version(&conn)? {
            if found > CURRENT_SCHEMA_VERSION {
                return Err(RepositoryError::SchemaVersionMismatch {
                    found,
                    expected: CURRENT_SCHEMA_VERSION,
                });
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 注册目标应用及其字段定义（已存在则替换字段定义）
    pub fn register_target(&self, target: &str, fields: &[FieldProperty]) -> RepositoryResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "INSERT OR IGNORE INTO target_app (target_id) VALUES (?1)",
            params![target],
        )?;
        tx.execute("DELETE FROM target_field WHERE target_id = ?1", params![target])?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO target_field (target_id, code, label, field_type, is_unique)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for field in fields {
                stmt.execute(params![
                    target,
                    field.code,
                    field.label,
                    field.field_type,
                    field.unique
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        info!(target = %target, fields = fields.len(), "目标应用已注册");
        Ok(())
    }

    /// 查询目标应用的全部记录（按记录 ID 升序）
    pub fn list_records(&self, target: &str) -> RepositoryResult<Vec<StoredRecord>> {
        let conn = self.lock()?;
        Self::ensure_target(&conn, target)?;
        Self::load_records(&conn, target)
    }

    /// 统计目标应用的记录数
    pub fn count_records(&self, target: &str) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        Self::ensure_target(&conn, target)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM target_record WHERE target_id = ?1",
            params![target],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn ensure_target(conn: &Connection, target: &str) -> RepositoryResult<()> {
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM target_app WHERE target_id = ?1",
                params![target],
                |row| row.get(0),
            )
            .optional()?;

        match exists {
            Some(_) => Ok(()),
            None => Err(RepositoryError::TargetNotFound {
                target: target.to_string(),
            }),
        }
    }

    fn load_schema(conn: &Connection, target: &str) -> RepositoryResult<FieldSchema> {
        Self::ensure_target(conn, target)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT code, label, field_type, is_unique
            FROM target_field
            WHERE target_id = ?1
            ORDER BY code
            "#,
        )?;
        let fields = stmt
            .query_map(params![target], |row| {
                Ok(FieldProperty {
                    code: row.get(0)?,
                    label: row.get(1)?,
                    field_type: row.get(2)?,
                    unique: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FieldSchema::new(fields))
    }

    fn load_records(conn: &Connection, target: &str) -> RepositoryResult<Vec<StoredRecord>> {
        let mut stmt = conn.prepare(
            "SELECT record_id, data_json FROM target_record WHERE target_id = ?1 ORDER BY record_id",
        )?;
        let rows = stmt
            .query_map(params![target], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(record_id, data_json)| -> RepositoryResult<StoredRecord> {
                let fields: BTreeMap<String, String> = serde_json::from_str(&data_json)?;
                Ok(StoredRecord {
                    record_id: record_id.to_string(),
                    fields,
                })
            })
            .collect()
    }

    /// 整批校验
    ///
    /// 规则:
    /// - 字段代码必须存在于目标应用
    /// - NUMBER 字段非空时必须可解析为数值
    /// - unique 字段非空时不得与已有记录或同批次记录重复
    fn validate_batch(
        schema: &FieldSchema,
        existing: &[StoredRecord],
        records: &[ImportRecord],
    ) -> FieldValidationErrors {
        let mut errors = FieldValidationErrors::new();

        let unique_codes: Vec<&str> = schema
            .unique_fields(false)
            .into_iter()
            .map(|f| f.code.as_str())
            .collect();
        let mut taken: HashMap<&str, HashSet<String>> = unique_codes
            .iter()
            .map(|code| {
                let values = existing
                    .iter()
                    .filter_map(|r| r.value(code))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                (*code, values)
            })
            .collect();

        for (idx, record) in records.iter().enumerate() {
            for (code, value) in &record.fields {
                let location = format!("records[{}].{}", idx, code);
                let value = value.as_deref().unwrap_or("");

                let Some(field) = schema.get(code) else {
                    errors.push(location, "字段代码不存在于目标应用");
                    continue;
                };

                if field.field_type == "NUMBER"
                    && !value.is_empty()
                    && value.trim().parse::<f64>().is_err()
                {
                    errors.push(location.clone(), format!("数值格式不正确: {}", value));
                }

                if field.unique && !value.is_empty() {
                    if let Some(values) = taken.get_mut(field.code.as_str()) {
                        if !values.insert(value.to_string()) {
                            errors.push(location, format!("值重复: {}", value));
                        }
                    }
                }
            }
        }

        errors
    }
}

#[async_trait]
impl RemoteStore for SqliteRecordStore {
    async fn get_field_schema(&self, target: &str) -> RepositoryResult<FieldSchema> {
        let conn = self.lock()?;
        let schema = Self::load_schema(&conn, target)?;
        debug!(target = %target, fields = schema.len(), "字段定义读取完成");
        Ok(schema)
    }

    async fn get_all_values(&self, target: &str, field: &str) -> RepositoryResult<Vec<FieldValue>> {
        let conn = self.lock()?;
        let schema = Self::load_schema(&conn, target)?;
        if !schema.contains_code(field) {
            return Err(RepositoryError::FieldNotFound {
                target: target.to_string(),
                field: field.to_string(),
            });
        }

        let values = Self::load_records(&conn, target)?
            .into_iter()
            .map(|record| {
                let value = record.value(field).unwrap_or("").to_string();
                FieldValue::new(record.record_id, value)
            })
            .collect::<Vec<_>>();

        debug!(target = %target, field = %field, count = values.len(), "字段值读取完成");
        Ok(values)
    }

    async fn submit_records(
        &self,
        target: &str,
        records: &[ImportRecord],
    ) -> RepositoryResult<Vec<String>> {
        let mut conn = self.lock()?;
        let schema = Self::load_schema(&conn, target)?;
        let existing = Self::load_records(&conn, target)?;

        let errors = Self::validate_batch(&schema, &existing, records);
        if !errors.is_empty() {
            warn!(target = %target, errors = errors.message_count(), "批量提交校验失败");
            return Err(RepositoryError::Validation(errors));
        }

        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        let mut record_ids = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO target_record (target_id, data_json, created_at) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                let data: BTreeMap<&str, &str> = record
                    .fields
                    .iter()
                    .map(|(code, value)| (code.as_str(), value.as_deref().unwrap_or("")))
                    .collect();
                let data_json = serde_json::to_string(&data)?;
                stmt.execute(params![target, data_json, now])?;
                record_ids.push(tx.last_insert_rowid().to_string());
            }
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(target = %target, count = record_ids.len(), "批量提交完成");
        Ok(record_ids)
    }
}
