// ==========================================
// CSV 导入核心 - 配置层
// ==========================================
// 职责: 导入设置的加载、解析与校验
// 存储: 插件式字符串键值对
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_settings;

// 重导出核心配置类型
pub use config_manager::{config_keys, parse_lot_guard_option, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use import_settings::ImportSettings;
