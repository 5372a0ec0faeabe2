// ==========================================
// SQLite 记录库端到端测试
// ==========================================
// 测试目标: 配置文件 → 导入 → 本地记录库，含批次防重与整批校验
// ==========================================


use lot_guard_import::config::{ConfigManager, ImportConfigReader};
use lot_guard_import::domain::{FieldProperty, HeaderMode, SourceText, SummaryKind};
use lot_guard_import::importer::{import_all, ImportError, ImportErrorKind};
use lot_guard_import::logging;
use lot_guard_import::repository::SqliteRecordStore;
use std::io::Write;
use tempfile::NamedTempFile;
use test_helpers::{create_test_store, sample_fields, TARGET};

const SOURCE: &str = "批次号,品名,数量,出货日\r\n\
L001,钢卷,1,2024-01-05\r\n\
L002,\"钢板\n(二级)\",2,2024-01-06\r\n\
L003,钢带,3,2024-01-07";

fn settings_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();
    file
}

#[tokio::test]
async fn test_import_from_settings_file() {
    logging::init_test();

    let (_db_file, store) = create_test_store(&sample_fields()).unwrap();
    let config_file = settings_file(
        r#"{"import_app":"100","header_handling":"字段名","lotguard":"on","lotguard_field":"lot_no"}"#,
    );
    let settings = ConfigManager::from_json_file(config_file.path())
        .unwrap()
        .load_import_settings()
        .unwrap();
    assert_eq!(settings.header_mode, HeaderMode::ByName);

    let summary = import_all(
        store.clone(),
        settings.clone(),
        vec![SourceText::new("a.csv", SOURCE)],
    )
    .await
    .unwrap();
    assert_eq!(summary.total_imported, 3);

    let records = store.list_records(TARGET).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].value("item"), Some("钢板\n(二级)"));
    // 最后一行没有换行也不丢失
    assert_eq!(records[2].value("ship_date"), Some("2024-01-07"));

    // 再次导入: 已存在的批次号全部被过滤，新批次号正常导入
    let again = format!("{}\r\nL004,钢卷,4,2024-01-08\r\n", SOURCE);
    let summary = import_all(store.clone(), settings, vec![SourceText::new("b.csv", again)])
        .await
        .unwrap();
    assert_eq!(summary.total_imported, 1);
    assert_eq!(summary.files[0].skipped_by_guard, 3);
    assert_eq!(summary.kind(), SummaryKind::Imported);
    assert_eq!(store.count_records(TARGET).unwrap(), 4);
}

#[tokio::test]
async fn test_store_validation_rejects_batch() {
    let fields = vec![
        FieldProperty::new("lot_no", "批次号", "SINGLE_LINE_TEXT").unique(),
        FieldProperty::new("qty", "数量", "NUMBER"),
    ];
    let (_db_file, store) = create_test_store(&fields).unwrap();

    let mut config = ConfigManager::default();
    config.set("import_app", TARGET);
    config.set("header_handling", "BY_CODE");
    config.set("lotguard", "off");
    config.set("max_error_messages", "2");
    let settings = config.load_import_settings().unwrap();

    let text = "lot_no,qty\nL001,1\nL001,x\nL002,y\nL003,z\n";
    let err = import_all(store.clone(), settings, vec![SourceText::new("bad.csv", text)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::RemoteSubmission);
    let message = err.to_string();
    let lines: Vec<&str> = message.lines().collect();
    assert_eq!(lines[0], "向应用(id:100)登记文件[bad.csv]的记录时发生错误。");
    assert_eq!(lines[1], "[records[1].lot_no] 值重复: L001");
    assert_eq!(lines[2], "[records[1].qty] 数值格式不正确: x");
    assert_eq!(lines[3], "以下 2 条错误信息已省略。");
    assert_eq!(lines.len(), 4);

    // 整批未写入
    assert_eq!(store.count_records(TARGET).unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_target() {
    let store = SqliteRecordStore::in_memory().unwrap();
    let config = ConfigManager::from_json_str(
        r#"{"import_app":"404","header_handling":"BY_CODE","lotguard":"off"}"#,
    )
    .unwrap();
    let settings = config.load_import_settings().unwrap();

    let err = import_all(store, settings, vec![SourceText::new("a.csv", "lot_no\nL1\n")])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ImportErrorKind::RemoteTransport);
    assert!(matches!(err, ImportError::Transport { .. }));
}

#[tokio::test]
async fn test_invalid_lot_guard_option() {
    let config = ConfigManager::from_json_str(
        r#"{"import_app":"100","header_handling":"BY_CODE","lotguard":"yes"}"#,
    )
    .unwrap();

    let err = config.load_import_settings().unwrap_err();
    assert!(matches!(err, ImportError::LotGuardOptionInvalid(ref v) if v == "yes"));
    assert_eq!(err.kind(), ImportErrorKind::Configuration);
}
