//! 解析表
//!
//! 必須シートの測定行をシート順に1つの表へまとめ、VL2/BL1 比・相対ウェル番号・
//! 傾き補正値を計算する。見出し行・空行・mean/sd 行は含めない。

use crate::error::ValidationError;
use crate::rules::RequiredSheetSet;
use crate::workbook::{self, RowKind};
use calamine::{Data, Reader};
use serde::Serialize;

/// 測定データの列名（先頭から位置で対応付ける）
pub const MEASUREMENT_COLUMNS: &[&str] = &[
    "well_number",
    "total_count",
    "phl_count",
    "yemk_count",
    "live_percentage",
    "dead_percentage",
    "phl_vl2",
    "phl_bl1",
    "yemk_vl2",
    "yemk_bl1",
];

/// 解析で追加する列名
pub const DERIVED_COLUMNS: &[&str] = &[
    "pHL_VL2_BL1",
    "yemk_vl2_bl1",
    "relative_well_number",
    "slope_corrected_phl_vl2_bl1",
    "slope_corrected_yemk_vl2_bl1",
];

/// 解析シートに書き出すシート名
pub const ANALYSIS_SHEET: &str = "Analysis";

const PHL_VL2: usize = 6;
const PHL_BL1: usize = 7;
const YEMK_VL2: usize = 8;
const YEMK_BL1: usize = 9;

/// セル値
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// 数値として読む（数値文字列も受け付ける）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

/// 解析表の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRow {
    /// 元のシート名
    pub sheet: String,
    /// `MEASUREMENT_COLUMNS` と同じ並び。足りない列は `Empty`
    pub measurements: Vec<CellValue>,
    pub phl_ratio: Option<f64>,
    pub yemk_ratio: Option<f64>,
    /// 1始まりの通し番号
    pub relative_well_number: usize,
    pub phl_corrected: Option<f64>,
    pub yemk_corrected: Option<f64>,
}

impl AnalysisRow {
    fn number(&self, index: usize) -> Option<f64> {
        self.measurements.get(index).and_then(CellValue::as_number)
    }
}

/// 解析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTable {
    pub rows: Vec<AnalysisRow>,
    /// pHL_VL2_BL1 を relative_well_number に回帰した傾き
    pub phl_slope: Option<f64>,
    pub yemk_slope: Option<f64>,
}

/// ブックのバイト列から解析表を作る
pub fn analyze(bytes: &[u8], required: &RequiredSheetSet) -> Result<AnalysisTable, ValidationError> {
    let mut book = workbook::open(bytes)?;

    let missing = required.missing_from(&book.sheet_names());
    if !missing.is_empty() {
        return Err(ValidationError::MissingSheet { missing });
    }

    let mut rows = Vec::new();
    for name in required.names() {
        let range = book
            .worksheet_range(name)
            .map_err(|e| ValidationError::UnreadableFile {
                reason: format!("{}: {}", name, e),
            })?;

        for row in range.rows().skip(1) {
            if workbook::classify_row(row) != RowKind::Data {
                continue;
            }
            let mut measurements: Vec<CellValue> = row
                .iter()
                .take(MEASUREMENT_COLUMNS.len())
                .map(CellValue::from)
                .collect();
            measurements.resize(MEASUREMENT_COLUMNS.len(), CellValue::Empty);

            let mut analysis_row = AnalysisRow {
                sheet: name.clone(),
                measurements,
                phl_ratio: None,
                yemk_ratio: None,
                relative_well_number: rows.len() + 1,
                phl_corrected: None,
                yemk_corrected: None,
            };
            analysis_row.phl_ratio = ratio(analysis_row.number(PHL_VL2), analysis_row.number(PHL_BL1));
            analysis_row.yemk_ratio = ratio(analysis_row.number(YEMK_VL2), analysis_row.number(YEMK_BL1));
            rows.push(analysis_row);
        }
    }

    let phl_slope = slope(rows.iter().filter_map(|r| r.phl_ratio.map(|y| (r.relative_well_number as f64, y))));
    let yemk_slope = slope(rows.iter().filter_map(|r| r.yemk_ratio.map(|y| (r.relative_well_number as f64, y))));

    for row in &mut rows {
        let x = row.relative_well_number as f64;
        row.phl_corrected = corrected(row.phl_ratio, x, phl_slope);
        row.yemk_corrected = corrected(row.yemk_ratio, x, yemk_slope);
    }

    tracing::debug!(rows = rows.len(), ?phl_slope, ?yemk_slope, "analysis table built");

    Ok(AnalysisTable { rows, phl_slope, yemk_slope })
}

/// 分母が0または欠損なら None
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn corrected(ratio: Option<f64>, x: f64, slope: Option<f64>) -> Option<f64> {
    Some(ratio? - x * slope?)
}

/// 最小二乗法による傾き
///
/// 点が2つ未満、または x が全て同じ場合は None。
pub fn slope(points: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let points: Vec<(f64, f64)> = points.into_iter().collect();
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let sxy: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    Some(sxy / sxx)
}
