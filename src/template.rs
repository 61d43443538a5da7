//! テンプレートExcel生成
//!
//! 必須シートと見出し行だけを持つ空のブックを作る。

use crate::error::Result;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use upload_guard_common::{FormGuard, ValidationError, MEASUREMENT_COLUMNS};

/// テンプレートを書き出す
///
/// `category` 指定時は出力ファイル名が送信ガードを通るかを先に確認する。
pub fn generate_template(guard: &FormGuard, output_path: &Path, category: Option<&str>) -> Result<()> {
    if let Some(category) = category {
        let file_name = output_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        guard.validate(file_name.as_deref(), &[category])?;
    } else if !guard
        .rules()
        .is_accepted_file(&output_path.to_string_lossy())
    {
        return Err(ValidationError::InvalidFileType {
            file_name: output_path.display().to_string(),
        }
        .into());
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for name in guard.rules().required_sheets.names() {
        let sheet = workbook.add_worksheet().set_name(name)?;
        for (col, title) in MEASUREMENT_COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header)?;
        }
        sheet.set_freeze_panes(1, 0)?;
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    workbook.save(output_path)?;

    Ok(())
}
