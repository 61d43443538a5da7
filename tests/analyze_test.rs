//! 解析コマンドの統合テスト
//!
//! 測定値入りのxlsxを生成し、解析表と "Analysis" シートの出力を確認する

use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use upload_guard::analyze;
use upload_guard::error::GuardError;
use upload_guard_common::{Error, FormGuard, ValidationError, MEASUREMENT_COLUMNS};

/// phl_vl2 = 2x + 1、phl_bl1 = 1 の行を Samples に n 行、High Controls に1行書く
fn write_measurements(dir: &Path, samples: u32) -> PathBuf {
    let mut workbook = Workbook::new();
    let mut well = 0.0;
    for name in ["Samples", "High Controls"] {
        let rows = if name == "Samples" { samples } else { 1 };
        let sheet = workbook.add_worksheet().set_name(name).expect("シート名設定失敗");
        for (col, title) in MEASUREMENT_COLUMNS.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).expect("書き込み失敗");
        }
        for r in 1..=rows {
            well += 1.0;
            sheet.write_string(r, 0, format!("W{}", r)).expect("書き込み失敗");
            sheet.write_number(r, 6, 2.0 * well + 1.0).expect("書き込み失敗");
            sheet.write_number(r, 7, 1.0).expect("書き込み失敗");
        }
    }
    let path = dir.join("LC2-032_KCP1.xlsx");
    workbook.save(&path).expect("xlsx保存失敗");
    path
}

/// 傾き2の比は補正後に定数1になる
#[tokio::test]
async fn test_analyze_file_slope_correction() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_measurements(dir.path(), 4);

    let table = analyze::analyze_file(&FormGuard::default(), &path).await.unwrap();

    assert_eq!(table.rows.len(), 5);
    assert!((table.phl_slope.unwrap() - 2.0).abs() < 1e-9);
    // yemk 列は空なので比も傾きも出ない
    assert_eq!(table.yemk_slope, None);
    for row in &table.rows {
        assert!((row.phl_corrected.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(row.yemk_corrected, None);
    }
}

/// 出力先のブックは "Analysis" シートだけを持ち、元ファイルは変わらない
#[tokio::test]
async fn test_analysis_sheet_written_next_to_input() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_measurements(dir.path(), 2);
    let original = std::fs::read(&path).unwrap();

    let table = analyze::analyze_file(&FormGuard::default(), &path).await.unwrap();
    let output = analyze::default_output_path(&path);
    analyze::write_analysis(&table, &path, &output).unwrap();

    assert_eq!(output, dir.path().join("LC2-032_KCP1_analysis.xlsx"));
    let written = std::fs::read(&output).unwrap();
    assert_eq!(upload_guard_common::sheet_names(&written).unwrap(), vec!["Analysis"]);
    assert_eq!(std::fs::read(&path).unwrap(), original);
}

/// 必須シートが無いブックは解析しない
#[tokio::test]
async fn test_analyze_file_missing_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("only_samples.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet().set_name("Samples").expect("シート名設定失敗");
    workbook.save(&path).expect("xlsx保存失敗");

    let result = analyze::analyze_file(&FormGuard::default(), &path).await;

    assert!(matches!(
        result,
        Err(GuardError::Common(Error::Validation(ValidationError::MissingSheet { .. })))
    ));
}

#[tokio::test]
async fn test_analyze_file_not_found() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = analyze::analyze_file(&FormGuard::default(), &dir.path().join("none.xlsx")).await;
    assert!(matches!(result, Err(GuardError::FileNotFound(_))));
}
