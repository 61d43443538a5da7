//! ワークブック読み込み
//!
//! バイト列を calamine でデコードし、シート名と必須シートの行数を取り出す。
//! 形式（xlsx/xlsb/xls/ods）は中身から判定する。
//! 壊れたファイルは `ValidationError::UnreadableFile` になる。

use crate::error::ValidationError;
use crate::rules::RequiredSheetSet;
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// 集計行とみなす先頭セルの値（小文字）
const SUMMARY_ROW_LABELS: &[&str] = &["mean", "sd"];

pub(crate) fn open(bytes: &[u8]) -> Result<Sheets<Cursor<&[u8]>>, ValidationError> {
    open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| ValidationError::UnreadableFile {
        reason: e.to_string(),
    })
}

/// 行の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowKind {
    /// 全セル空
    Empty,
    /// 先頭セルが mean / sd
    Summary,
    Data,
}

pub(crate) fn classify_row(row: &[Data]) -> RowKind {
    if row.iter().all(|cell| matches!(cell, Data::Empty)) {
        RowKind::Empty
    } else if is_summary_row(row) {
        RowKind::Summary
    } else {
        RowKind::Data
    }
}

/// ワークブックのシート名一覧（ブック内の順序）
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>, ValidationError> {
    let workbook = open(bytes)?;
    Ok(workbook.sheet_names())
}

/// 必須シート1枚分の集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub name: String,
    /// 空行と mean/sd 行を除いたデータ行数（見出し行を除く）
    pub data_rows: usize,
    /// 除外した mean/sd 行
    pub summary_rows: usize,
}

/// 必須シートごとのデータ行数を数える
///
/// 1行目は見出しとして扱う。存在しないシートは `MissingSheet` を返す。
pub fn summarize(bytes: &[u8], required: &RequiredSheetSet) -> Result<Vec<SheetSummary>, ValidationError> {
    let mut workbook = open(bytes)?;

    let missing = required.missing_from(&workbook.sheet_names());
    if !missing.is_empty() {
        return Err(ValidationError::MissingSheet { missing });
    }

    let mut summaries = Vec::with_capacity(required.names().len());
    for name in required.names() {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ValidationError::UnreadableFile {
                reason: format!("{}: {}", name, e),
            })?;

        let mut data_rows = 0;
        let mut summary_rows = 0;
        for row in range.rows().skip(1) {
            match classify_row(row) {
                RowKind::Empty => {}
                RowKind::Summary => summary_rows += 1,
                RowKind::Data => data_rows += 1,
            }
        }

        summaries.push(SheetSummary {
            name: name.clone(),
            data_rows,
            summary_rows,
        });
    }

    Ok(summaries)
}

fn is_summary_row(row: &[Data]) -> bool {
    match row.first() {
        Some(Data::String(s)) => {
            let label = s.trim().to_lowercase();
            SUMMARY_ROW_LABELS.contains(&label.as_str())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_with(sheets: &[&str]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        for name in sheets {
            workbook.add_worksheet().set_name(*name).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_sheet_names_in_order() {
        let bytes = workbook_with(&["Samples", "High Controls", "Notes"]);
        assert_eq!(sheet_names(&bytes).unwrap(), vec!["Samples", "High Controls", "Notes"]);
    }

    #[test]
    fn test_classify_row() {
        assert_eq!(classify_row(&[Data::Empty, Data::Empty]), RowKind::Empty);
        assert_eq!(classify_row(&[Data::String(" SD ".into()), Data::Float(0.2)]), RowKind::Summary);
        assert_eq!(classify_row(&[Data::String("A1".into()), Data::Empty]), RowKind::Data);
        assert_eq!(classify_row(&[Data::Empty, Data::String("mean".into())]), RowKind::Data);
    }

    #[test]
    fn test_sheet_names_rejects_garbage() {
        let result = sheet_names(b"well_number,total_count\n1,2\n");
        assert!(matches!(result, Err(ValidationError::UnreadableFile { .. })));
    }

    #[test]
    fn test_sheet_names_rejects_empty() {
        assert!(matches!(sheet_names(&[]), Err(ValidationError::UnreadableFile { .. })));
    }

    #[test]
    fn test_summarize_skips_empty_and_summary_rows() {
        let mut workbook = Workbook::new();
        let samples = workbook.add_worksheet().set_name("Samples").unwrap();
        samples.write_string(0, 0, "well_number").unwrap();
        samples.write_string(1, 0, "A1").unwrap();
        samples.write_number(1, 1, 120.0).unwrap();
        samples.write_string(2, 0, "A2").unwrap();
        // 3行目は空行
        samples.write_string(4, 0, "Mean").unwrap();
        samples.write_string(5, 0, "SD").unwrap();
        samples.write_string(6, 0, "A3").unwrap();

        let controls = workbook.add_worksheet().set_name("High Controls").unwrap();
        controls.write_string(0, 0, "well_number").unwrap();
        controls.write_string(1, 0, "H1").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let summaries = summarize(&bytes, &RequiredSheetSet::default()).unwrap();

        assert_eq!(
            summaries,
            vec![
                SheetSummary { name: "Samples".into(), data_rows: 3, summary_rows: 2 },
                SheetSummary { name: "High Controls".into(), data_rows: 1, summary_rows: 0 },
            ]
        );
    }

    #[test]
    fn test_summarize_missing_sheet() {
        let bytes = workbook_with(&["Samples"]);
        let result = summarize(&bytes, &RequiredSheetSet::default());
        assert_eq!(
            result,
            Err(ValidationError::MissingSheet { missing: vec!["High Controls".into()] })
        );
    }
}
