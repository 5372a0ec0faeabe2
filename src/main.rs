// ==========================================
// CSV 导入核心 - 命令行入口
// ==========================================
// 用法: lot-guard-import <settings.json> <file.csv>...
// 数据库: LOT_GUARD_IMPORT_DB_PATH 或用户数据目录
// 日志: RUST_LOG 级别，LOT_GUARD_IMPORT_LOG_FORMAT=json 输出 JSON
// ==========================================

use anyhow::{bail, Context, Result};
use lot_guard_import::config::{ConfigManager, ImportConfigReader};
use lot_guard_import::db::get_default_db_path;
use lot_guard_import::importer::import_all;
use lot_guard_import::{logging, SourceText, SqliteRecordStore};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

fn read_source(path: &Path) -> Result<SourceText> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取源文件（需为 UTF-8）: {}", path.display()))?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SourceText::new(file_name, text))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("用法: lot-guard-import <settings.json> <file.csv>...");
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", lot_guard_import::APP_NAME, lot_guard_import::VERSION);
    tracing::info!("==================================================");

    let settings = ConfigManager::from_json_file(&args[0])?.load_import_settings()?;

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let store = SqliteRecordStore::new(&db_path)
        .with_context(|| format!("无法打开记录库: {}", db_path))?;

    let sources = args[1..]
        .iter()
        .map(|p| read_source(Path::new(p)))
        .collect::<Result<Vec<_>>>()?;

    match import_all(store, settings, sources).await {
        Ok(summary) => {
            println!("{}", summary.message());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
