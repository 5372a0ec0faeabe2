// ==========================================
// CSV 导入核心 - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道各阶段的接口（不包含实现）
// ==========================================

use crate::domain::{FieldSchema, HeaderMode, HeaderTable, ImportRecord, ImportSummary, SourceText};
use crate::importer::conflict_handler::{GuardValueSet, LotGuard};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::Grid;
use crate::repository::FieldValue;
use async_trait::async_trait;

// ==========================================
// Importer Trait
// ==========================================
// 用途: 导入主接口
// 实现者: ImportCoordinator
#[async_trait]
pub trait Importer: Send + Sync {
    /// 按输入顺序导入全部源文件
    ///
    /// # 返回
    /// - Ok(ImportSummary): 汇总（含各文件结果与操作员消息）
    /// - Err: 首个不可恢复的错误（已附加目标应用与文件名上下文）
    ///
    /// # 流程
    /// FETCH_SCHEMA → FETCH_GUARD_VALUES（可选）→ 每个文件:
    /// PARSE → MAP_HEADERS → FILTER → SUBMIT
    async fn import_all(&self, sources: Vec<SourceText>) -> ImportResult<ImportSummary>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文本解析接口（PARSE）
// 实现者: DelimitedTextParser
pub trait FileParser: Send + Sync {
    /// 解析已解码文本为网格（不产生错误，引号不配对按已知限制处理）
    fn parse_to_grid(&self, text: &str) -> Grid;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 表头映射接口（MAP_HEADERS）
// 实现者: HeaderRecordMapper
pub trait FieldMapper: Send + Sync {
    /// 第 0 行作为表头，其余每行转为一条记录
    ///
    /// # 返回
    /// - Err(EmptySource): 网格没有表头行
    fn to_records(&self, grid: &Grid) -> ImportResult<HeaderTable>;

    /// 表头 → 字段代码
    ///
    /// # 返回
    /// - Err(SchemaMismatch): BY_NAME 下表头在目标应用中不存在
    /// - Err(AmbiguousLabel): BY_NAME 下表头对应多个同名字段
    /// - Err(HeaderCollision): 多个列对应同一字段代码
    fn resolve_headers(
        &self,
        table: HeaderTable,
        schema: &FieldSchema,
        mode: HeaderMode,
        target: &str,
    ) -> ImportResult<Vec<ImportRecord>>;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 批次防重接口（FILTER）
// 实现者: LotGuardFilter
pub trait ConflictHandler: Send + Sync {
    /// 已存在值去空、去重
    fn unique_values(&self, remote_values: &[FieldValue], guard_field: &str) -> GuardValueSet;

    /// 排除防重字段值已存在的记录（guard 为 None 时原样返回）
    ///
    /// # 返回
    /// - Err(GuardFieldMissing): 首条记录没有防重字段
    fn filter(
        &self,
        records: Vec<ImportRecord>,
        guard: Option<&LotGuard>,
        schema: &FieldSchema,
        target: &str,
    ) -> ImportResult<Vec<ImportRecord>>;
}
