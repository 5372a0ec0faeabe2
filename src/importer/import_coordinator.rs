// ==========================================
// CSV 导入核心 - 导入协调器
// ==========================================
// 职责: 整合导入流程，从源文本到目标应用
// 流程: 字段定义 → 防重值（可选）→ 每个文件: 解析 → 表头映射 → 防重过滤 → 提交
// 红线: 严格串行，文件按输入顺序处理，任何阶段失败即终止
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{
    FieldSchema, FileImportOutcome, ImportStage, ImportSummary, SourceText,
};
use crate::importer::conflict_handler::{LotGuard, LotGuardFilter};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::error_report::compose_submission_error;
use crate::importer::field_mapper::HeaderRecordMapper;
use crate::importer::file_parser::DelimitedTextParser;
use crate::importer::import_trait::{ConflictHandler, FieldMapper, FileParser, Importer};
use crate::repository::RemoteStore;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// ImportCoordinator - 导入协调器
// ==========================================
pub struct ImportCoordinator<S>
where
    S: RemoteStore,
{
    // 目标记录库
    store: S,

    // 本次运行的设置
    settings: ImportSettings,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    conflict_handler: Box<dyn ConflictHandler>,
}

impl<S> ImportCoordinator<S>
where
    S: RemoteStore,
{
    /// 创建新的 ImportCoordinator 实例
    ///
    /// # 参数
    /// - store: 目标记录库
    /// - settings: 导入设置
    /// - file_parser: 文本解析器
    /// - field_mapper: 表头映射器
    /// - conflict_handler: 批次防重过滤器
    pub fn new(
        store: S,
        settings: ImportSettings,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        conflict_handler: Box<dyn ConflictHandler>,
    ) -> Self {
        Self {
            store,
            settings,
            file_parser,
            field_mapper,
            conflict_handler,
        }
    }

    /// 使用默认组件（逗号分隔、双引号、CR/LF 换行）
    pub fn with_defaults(store: S, settings: ImportSettings) -> Self {
        Self::new(
            store,
            settings,
            Box::new(DelimitedTextParser::default()),
            Box::new(HeaderRecordMapper),
            Box::new(LotGuardFilter),
        )
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn target(&self) -> &str {
        &self.settings.target_id
    }

    // ==========================================
    // 运行级阶段（每次运行一次，所有文件共用）
    // ==========================================

    async fn fetch_schema(&self) -> ImportResult<FieldSchema> {
        debug!(stage = %ImportStage::FetchSchema, target = %self.target(), "读取目标应用字段定义");

        let schema = self
            .store
            .get_field_schema(self.target())
            .await
            .map_err(|source| ImportError::Transport {
                stage: ImportStage::FetchSchema,
                target: self.target().to_string(),
                source,
            })?;

        info!(target = %self.target(), fields = schema.len(), "字段定义读取完成");
        Ok(schema)
    }

    async fn fetch_guard(&self) -> ImportResult<Option<LotGuard>> {
        let Some(guard_field) = self.settings.guard_field() else {
            debug!("批次防重未启用，跳过已存在值读取");
            return Ok(None);
        };

        debug!(
            stage = %ImportStage::FetchGuardValues,
            target = %self.target(),
            guard_field = %guard_field,
            "读取防重字段已存在值"
        );

        let remote_values = self
            .store
            .get_all_values(self.target(), guard_field)
            .await
            .map_err(|source| ImportError::Transport {
                stage: ImportStage::FetchGuardValues,
                target: self.target().to_string(),
                source,
            })?;

        let values = self
            .conflict_handler
            .unique_values(&remote_values, guard_field);
        info!(
            guard_field = %guard_field,
            existing = values.len(),
            "防重字段已存在值读取完成"
        );

        Ok(Some(LotGuard::new(guard_field, values)))
    }

    // ==========================================
    // 文件级阶段
    // ==========================================

    async fn import_file(
        &self,
        source: &SourceText,
        schema: &FieldSchema,
        guard: Option<&LotGuard>,
    ) -> ImportResult<FileImportOutcome> {
        let file = source.file_name.as_str();

        // === PARSE ===
        debug!(stage = %ImportStage::Parse, file = %file, "解析源文本");
        let grid = self.file_parser.parse_to_grid(&source.text);
        debug!(rows = grid.max_y(), columns = grid.max_x(), "源文本解析完成");

        // === MAP_HEADERS ===
        debug!(stage = %ImportStage::MapHeaders, file = %file, "表头映射");
        let table = self.field_mapper.to_records(&grid)?;
        let records = self.field_mapper.resolve_headers(
            table,
            schema,
            self.settings.header_mode,
            self.target(),
        )?;
        let source_rows = records.len();

        // === FILTER ===
        debug!(stage = %ImportStage::Filter, file = %file, records = source_rows, "批次防重过滤");
        let records = self
            .conflict_handler
            .filter(records, guard, schema, self.target())?;
        let skipped_by_guard = source_rows - records.len();

        let mut outcome = FileImportOutcome {
            file_name: file.to_string(),
            source_rows,
            skipped_by_guard,
            ..Default::default()
        };

        if records.is_empty() {
            info!(file = %file, source_rows, skipped_by_guard, "没有需要提交的记录，跳过提交");
            return Ok(outcome);
        }

        // === SUBMIT ===
        debug!(stage = %ImportStage::Submit, file = %file, records = records.len(), "批量提交");
        let record_ids = self
            .store
            .submit_records(self.target(), &records)
            .await
            .map_err(|e| {
                compose_submission_error(
                    self.target(),
                    file,
                    e,
                    self.settings.max_error_messages,
                )
            })?;

        // 提交成功即整批登记；记录 ID 仅作附加信息，记录库可以不返回
        outcome.submitted = records.len();
        outcome.record_ids = record_ids;

        info!(
            stage = %ImportStage::Done,
            file = %file,
            source_rows,
            skipped_by_guard,
            submitted = outcome.submitted,
            "文件导入完成"
        );
        Ok(outcome)
    }

    fn failed(&self, err: ImportError) -> ImportError {
        error!(
            stage = %ImportStage::Failed,
            target = %self.target(),
            kind = ?err.kind(),
            error = %err,
            "导入失败"
        );
        err
    }
}

#[async_trait]
impl<S> Importer for ImportCoordinator<S>
where
    S: RemoteStore,
{
    #[instrument(skip(self, sources), fields(target = %self.settings.target_id, files = sources.len(), batch_id))]
    async fn import_all(&self, sources: Vec<SourceText>) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(
            header_mode = %self.settings.header_mode,
            lot_guard = self.settings.lot_guard_enabled,
            "开始导入"
        );

        self.settings.validate().map_err(|e| self.failed(e))?;

        let schema = self.fetch_schema().await.map_err(|e| self.failed(e))?;
        self.settings
            .validate_against_schema(&schema)
            .map_err(|e| self.failed(e))?;
        let guard = self.fetch_guard().await.map_err(|e| self.failed(e))?;

        let mut files = Vec::with_capacity(sources.len());
        for source in &sources {
            let outcome = self
                .import_file(source, &schema, guard.as_ref())
                .await
                .map_err(|e| self.failed(e.in_file(&source.file_name)))?;
            files.push(outcome);
        }

        let total_imported = files.iter().map(|f| f.submitted).sum();
        let summary = ImportSummary {
            batch_id,
            target_id: self.settings.target_id.clone(),
            lot_guard_enabled: self.settings.lot_guard_enabled,
            files,
            total_imported,
            imported_at: Utc::now(),
            elapsed: start_time.elapsed(),
        };

        info!(
            total_imported,
            kind = ?summary.kind(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "导入完成"
        );
        Ok(summary)
    }
}

/// 以默认组件执行一次导入
pub async fn import_all<S>(
    store: S,
    settings: ImportSettings,
    sources: Vec<SourceText>,
) -> ImportResult<ImportSummary>
where
    S: RemoteStore,
{
    ImportCoordinator::with_defaults(store, settings)
        .import_all(sources)
        .await
}
