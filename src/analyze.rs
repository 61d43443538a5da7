//! 解析シート出力
//!
//! 必須シートを解析表にまとめ、"Analysis" シート1枚のブックとして書き出す。
//! 元のブックは変更しない。

use crate::error::{GuardError, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use upload_guard_common::analysis::{ANALYSIS_SHEET, DERIVED_COLUMNS};
use upload_guard_common::{AnalysisTable, CellValue, FormGuard, MEASUREMENT_COLUMNS};

/// `<stem>_analysis.xlsx`（入力と同じフォルダ）
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "workbook".to_string());
    input.with_file_name(format!("{}_analysis.xlsx", stem))
}

/// ファイルを読んで解析表を作る
pub async fn analyze_file(guard: &FormGuard, path: &Path) -> Result<AnalysisTable> {
    if !path.is_file() {
        return Err(GuardError::FileNotFound(path.display().to_string()));
    }
    tracing::debug!(file = %path.display(), "analyzing workbook");

    let bytes = tokio::fs::read(path).await?;
    let table = upload_guard_common::analyze(&bytes, &guard.rules().required_sheets)?;
    Ok(table)
}

/// 解析表を書き出す
pub fn write_analysis(table: &AnalysisTable, input_path: &Path, output_path: &Path) -> Result<()> {
    if output_path == input_path {
        return Err(GuardError::Config(format!(
            "出力先が入力ファイルと同じです: {}",
            output_path.display()
        )));
    }
    let is_xlsx = output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(GuardError::Config(format!(
            "出力は .xlsx のみ対応: {}",
            output_path.display()
        )));
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet().set_name(ANALYSIS_SHEET)?;

    for (col, title) in MEASUREMENT_COLUMNS.iter().chain(DERIVED_COLUMNS).enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    let derived_start = MEASUREMENT_COLUMNS.len() as u16;
    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, value) in row.measurements.iter().enumerate() {
            write_cell(sheet, r, col as u16, value)?;
        }

        let derived = [
            row.phl_ratio,
            row.yemk_ratio,
            Some(row.relative_well_number as f64),
            row.phl_corrected,
            row.yemk_corrected,
        ];
        for (offset, value) in derived.iter().enumerate() {
            if let Some(v) = value {
                sheet.write_number(r, derived_start + offset as u16, *v)?;
            }
        }
    }
    sheet.set_freeze_panes(1, 0)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    workbook.save(output_path)?;
    tracing::debug!(rows = table.rows.len(), output = %output_path.display(), "analysis sheet written");

    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Empty => {}
        CellValue::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        CellValue::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}
