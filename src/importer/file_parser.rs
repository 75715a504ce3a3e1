// ==========================================
// 商品目录导入系统 - 表格解析器实现
// ==========================================
// 阶段 0: 表格字节 → 有序 RawRecord 列表
// 支持: 分隔文本 (.csv/.tsv/.txt) / 表格容器 (.xlsx/.xls/.xlsb/.ods)
// ==========================================

use crate::domain::catalog::{CellValue, RawRecord};
use crate::importer::catalog_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult, ParseIssue};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// 是否按分隔文本解析（其余一律按表格容器处理）
fn is_delimited_text(file_name: &str) -> bool {
    matches!(extension_of(file_name).as_str(), "csv" | "tsv" | "txt")
}

fn extension_of(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Vec<RawRecord>> {
        // 解码为 UTF-8（去掉 BOM）
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text =
            std::str::from_utf8(bytes).map_err(|e| ImportError::Utf8Decode(e.to_string()))?;

        let delimiter = if extension_of(file_name) == "tsv" {
            b'\t'
        } else {
            b','
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(false) // 列数不一致视为解析错误
            .from_reader(text.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行；收集全部解析错误后统一失败
        let mut records = Vec::new();
        let mut issues = Vec::new();
        for result in reader.records() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    let row = e.position().map(|p| p.record() as usize).unwrap_or(0);
                    issues.push(ParseIssue {
                        row,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let record: RawRecord = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.as_str(), CellValue::Text(value.to_string())))
                .collect();

            // 跳过完全空白的行
            if record.is_blank() {
                continue;
            }

            records.push(record);
        }

        if !issues.is_empty() {
            return Err(ImportError::CsvParseErrors(issues));
        }

        debug!(file_name, rows = records.len(), "CSV 解析完成");
        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 仅读取第一个工作表；空单元格统一为空字符串
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Vec<RawRecord>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ImportError::EmptyWorkbook)??;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = match rows.next() {
            Some(row) => row,
            None => return Ok(Vec::new()),
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut records = Vec::new();
        for data_row in rows {
            let record: RawRecord = headers
                .iter()
                .enumerate()
                .map(|(col_idx, header)| {
                    let value = data_row
                        .get(col_idx)
                        .map(to_cell_value)
                        .unwrap_or_else(|| CellValue::Text(String::new()));
                    (header.as_str(), value)
                })
                .collect();

            // 跳过完全空白的行
            if record.is_blank() {
                continue;
            }

            records.push(record);
        }

        debug!(file_name, rows = records.len(), "表格解析完成");
        Ok(records)
    }
}

/// calamine 单元格 → CellValue（空单元格为空字符串，日期等按文本）
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Text(String::new()),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

// ==========================================
// 通用表格解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Vec<RawRecord>> {
        if is_delimited_text(file_name) {
            CsvParser.parse_to_raw_records(file_name, bytes)
        } else {
            ExcelParser.parse_to_raw_records(file_name, bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parser_valid_file() {
        let csv = "name,price,applyTax,cgst\nWidget,100,true,6\n,200,false,0\n";
        let records = CsvParser
            .parse_to_raw_records("items.csv", csv.as_bytes())
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some(&CellValue::from("Widget")));
        assert_eq!(records[0].get("cgst"), Some(&CellValue::from("6")));
        assert_eq!(records[1].get("name"), Some(&CellValue::from("")));
    }

    #[test]
    fn test_csv_parser_trims_header_keys() {
        let csv = " Name ,Price \nWidget,10\n";
        let records = CsvParser
            .parse_to_raw_records("items.csv", csv.as_bytes())
            .unwrap();

        let keys: Vec<&str> = records[0].keys().collect();
        assert_eq!(keys, vec!["Name", "Price"]);
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"name\nWidget\n");
        let records = CsvParser.parse_to_raw_records("items.csv", &bytes).unwrap();

        assert_eq!(records[0].get("name"), Some(&CellValue::from("Widget")));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let csv = "name,price\nA,1\n,\nB,2\n";
        let records = CsvParser
            .parse_to_raw_records("items.csv", csv.as_bytes())
            .unwrap();

        // 应跳过空行
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_csv_parser_collects_all_row_errors() {
        let csv = "name,price\nA,1\nB\nC,3\nD,4,extra\n";
        let err = CsvParser
            .parse_to_raw_records("items.csv", csv.as_bytes())
            .unwrap_err();

        let issues = err.parse_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].row, 2);
        assert_eq!(issues[1].row, 4);
    }

    #[test]
    fn test_csv_parser_rejects_invalid_utf8() {
        let bytes = vec![b'n', b'a', b'm', b'e', b'\n', 0xFF, 0xFE];
        let err = CsvParser.parse_to_raw_records("items.csv", &bytes).unwrap_err();
        assert!(matches!(err, ImportError::Utf8Decode(_)));
    }

    #[test]
    fn test_tsv_uses_tab_delimiter() {
        let tsv = "name\tprice\nWidget\t5\n";
        let records = UniversalFileParser
            .parse_to_raw_records("items.TSV", tsv.as_bytes())
            .unwrap();
        assert_eq!(records[0].get("price"), Some(&CellValue::from("5")));
    }

    #[test]
    fn test_universal_parser_routes_unknown_extension_to_spreadsheet() {
        let err = UniversalFileParser
            .parse_to_raw_records("items.bin", b"not a workbook")
            .unwrap_err();
        assert!(matches!(err, ImportError::ExcelParseError(_)));
    }

    #[test]
    fn test_to_cell_value_types() {
        assert_eq!(to_cell_value(&Data::Empty), CellValue::Text(String::new()));
        assert_eq!(to_cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(to_cell_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(to_cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            to_cell_value(&Data::String("x".to_string())),
            CellValue::from("x")
        );
    }
}
