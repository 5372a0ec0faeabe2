// ==========================================
// CSV 导入核心 - 表头映射器
// ==========================================
// 职责: 网格 → 表头记录 → 字段代码记录
// 红线: 每条记录都包含全部表头键，缺失值显式为 None
// ==========================================

use crate::domain::schema::overlapped;
use crate::domain::{FieldSchema, HeaderMode, HeaderRecord, HeaderTable, ImportRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::Grid;
use crate::importer::import_trait::FieldMapper;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderRecordMapper;

impl FieldMapper for HeaderRecordMapper {
    fn to_records(&self, grid: &Grid) -> ImportResult<HeaderTable> {
        let headers = grid
            .header()
            .ok_or(ImportError::EmptySource {
                file: String::new(),
            })?
            .to_vec();

        let records = grid
            .rows()
            .iter()
            .enumerate()
            .skip(1)
            .map(|(row_number, row)| {
                // 超出表头的单元格只允许为空（如 "a,b," 的行尾空单元格）
                if let Some((x, value)) = row
                    .iter()
                    .enumerate()
                    .skip(headers.len())
                    .find(|(_, cell)| !cell.is_empty())
                {
                    return Err(ImportError::CellOutsideHeader {
                        row: row_number,
                        column: x + 1,
                        value: value.clone(),
                    });
                }

                if row.len() > headers.len() {
                    debug!(
                        row_number,
                        dropped = row.len() - headers.len(),
                        "行尾空单元格已忽略"
                    );
                }

                let fields = headers
                    .iter()
                    .enumerate()
                    .map(|(x, header)| (header.clone(), row.get(x).cloned()))
                    .collect();
                Ok(HeaderRecord { row_number, fields })
            })
            .collect::<ImportResult<Vec<_>>>()?;

        debug!(headers = headers.len(), records = records.len(), "表头记录转换完成");
        Ok(HeaderTable { headers, records })
    }

    fn resolve_headers(
        &self,
        table: HeaderTable,
        schema: &FieldSchema,
        mode: HeaderMode,
        target: &str,
    ) -> ImportResult<Vec<ImportRecord>> {
        let codes = self.resolve_header_codes(&table.headers, schema, mode, target)?;

        if let Some(field_code) = overlapped(&codes).into_iter().next() {
            return Err(ImportError::HeaderCollision { field_code });
        }

        let records = table
            .records
            .into_iter()
            .map(|record| ImportRecord {
                row_number: record.row_number,
                fields: codes
                    .iter()
                    .cloned()
                    .zip(record.fields.into_iter().map(|(_, value)| value))
                    .collect(),
            })
            .collect();

        Ok(records)
    }
}

impl HeaderRecordMapper {
    /// 表头行 → 字段代码列表（与表头一一对应）
    pub fn resolve_header_codes(
        &self,
        headers: &[String],
        schema: &FieldSchema,
        mode: HeaderMode,
        target: &str,
    ) -> ImportResult<Vec<String>> {
        match mode {
            HeaderMode::ByCode => Ok(headers.to_vec()),
            HeaderMode::ByName => {
                let index = schema.codes_by_label();
                let ambiguous = schema.duplicated_labels();

                headers
                    .iter()
                    .map(|label| {
                        let codes = index.get(label.as_str());

                        if ambiguous.contains(label) {
                            return Err(ImportError::AmbiguousLabel {
                                target: target.to_string(),
                                label: label.clone(),
                                codes: codes
                                    .map(|c| c.iter().map(|code| code.to_string()).collect())
                                    .unwrap_or_default(),
                            });
                        }

                        codes
                            .and_then(|c| c.first())
                            .map(|code| code.to_string())
                            .ok_or_else(|| ImportError::SchemaMismatch {
                                target: target.to_string(),
                                label: label.clone(),
                            })
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldProperty;
    use crate::importer::file_parser::DelimitedTextParser;

    fn schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldProperty::new("lot_no", "批次号", "SINGLE_LINE_TEXT").unique(),
            FieldProperty::new("qty", "数量", "NUMBER"),
            FieldProperty::new("memo_a", "备注", "MULTI_LINE_TEXT"),
            FieldProperty::new("memo_b", "备注", "MULTI_LINE_TEXT"),
        ])
    }

    fn table(text: &str) -> HeaderTable {
        let grid = DelimitedTextParser::default().parse(text);
        HeaderRecordMapper.to_records(&grid).unwrap()
    }

    #[test]
    fn test_to_records_short_row_keeps_every_key() {
        let table = table("批次号,数量\nL001,3\nL002\n");

        assert_eq!(table.headers, vec!["批次号", "数量"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].row_number, 1);
        assert_eq!(table.records[1].get("数量"), Some(&None));
        assert_eq!(table.records[1].fields.len(), 2);
    }

    #[test]
    fn test_to_records_empty_grid() {
        let grid = DelimitedTextParser::default().parse("");
        let result = HeaderRecordMapper.to_records(&grid);
        assert!(matches!(result, Err(ImportError::EmptySource { .. })));
    }

    #[test]
    fn test_to_records_rejects_value_outside_header() {
        let grid = DelimitedTextParser::default().parse("lot_no,qty\nL001,1\nL002,2,EXTRA\n");
        let result = HeaderRecordMapper.to_records(&grid);

        match result {
            Err(ImportError::CellOutsideHeader { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, 3);
                assert_eq!(value, "EXTRA");
            }
            other => panic!("应为 CellOutsideHeader: {:?}", other),
        }
    }

    #[test]
    fn test_to_records_ignores_trailing_empty_cells() {
        let table = table("lot_no,qty\nL001,1,\nL002,2,,\n");
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].fields.len(), 2);
        assert_eq!(table.records[1].get("qty"), Some(&Some("2".to_string())));
    }

    #[test]
    fn test_to_records_header_only() {
        let table = table("批次号,数量\n");
        assert_eq!(table.headers.len(), 2);
        assert!(table.records.is_empty());
    }

    #[test]
    fn test_resolve_by_code_is_identity() {
        let table = table("lot_no,anything\nL001,x\n");
        let records = HeaderRecordMapper
            .resolve_headers(table, &schema(), HeaderMode::ByCode, "100")
            .unwrap();

        let keys: Vec<&str> = records[0].fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["anything", "lot_no"]);
        assert_eq!(records[0].value("lot_no"), Some("L001"));
    }

    #[test]
    fn test_resolve_by_name() {
        let table = table("批次号,数量\nL001,3\nL002\n");
        let records = HeaderRecordMapper
            .resolve_headers(table, &schema(), HeaderMode::ByName, "100")
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value("lot_no"), Some("L001"));
        assert_eq!(records[0].value("qty"), Some("3"));
        assert!(records[1].contains_field("qty"));
        assert_eq!(records[1].value("qty"), None);
    }

    #[test]
    fn test_resolve_by_name_unknown_label() {
        let table = table("批次号,颜色\n");
        let result = HeaderRecordMapper.resolve_headers(table, &schema(), HeaderMode::ByName, "100");

        match result {
            Err(ImportError::SchemaMismatch { target, label }) => {
                assert_eq!(target, "100");
                assert_eq!(label, "颜色");
            }
            other => panic!("应为 SchemaMismatch: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_by_name_ambiguous_label() {
        let table = table("批次号,备注\nL001,x\n");
        let result = HeaderRecordMapper.resolve_headers(table, &schema(), HeaderMode::ByName, "100");
        assert!(matches!(
            result,
            Err(ImportError::AmbiguousLabel { label, codes, .. })
                if label == "备注" && codes == vec!["memo_a", "memo_b"]
        ));
    }

    #[test]
    fn test_resolve_header_collision() {
        let table = table("lot_no,lot_no\nL001,L002\n");
        let result = HeaderRecordMapper.resolve_headers(table, &schema(), HeaderMode::ByCode, "100");
        assert!(matches!(
            result,
            Err(ImportError::HeaderCollision { field_code }) if field_code == "lot_no"
        ));
    }
}
