// ==========================================
// CSV 导入核心 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含导入逻辑
// ==========================================

use crate::config::import_settings::ImportSettings;
use crate::domain::HeaderMode;
use crate::importer::error::ImportResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager
pub trait ImportConfigReader: Send + Sync {
    /// 导入目标应用 ID
    fn get_target_id(&self) -> ImportResult<String>;

    /// 表头解释方式
    ///
    /// # 返回
    /// - Err(ConfigMissing): 未设置
    /// - Err(HeaderModeInvalid): 无法识别
    fn get_header_mode(&self) -> ImportResult<HeaderMode>;

    /// 是否启用批次防重（"on" / "off"）
    fn is_lot_guard_enabled(&self) -> ImportResult<bool>;

    /// 防重判定字段代码（未选择时为空字符串）
    fn get_guard_field(&self) -> ImportResult<String>;

    /// 提交失败时最多展示的错误条数
    ///
    /// # 默认值
    /// - 5
    fn get_max_error_messages(&self) -> ImportResult<usize>;

    /// 汇总为 ImportSettings 并校验
    fn load_import_settings(&self) -> ImportResult<ImportSettings> {
        let settings = ImportSettings {
            target_id: self.get_target_id()?,
            header_mode: self.get_header_mode()?,
            lot_guard_enabled: self.is_lot_guard_enabled()?,
            guard_field: self.get_guard_field()?,
            max_error_messages: self.get_max_error_messages()?,
        };
        settings.validate()?;
        Ok(settings)
    }
}
