//! ファイル検証（CLI版）
//!
//! ブラウザと同じ送信ガードをディスク上のファイルに適用する。
//! alert の代わりに標準出力へ表示し、「送信」は受理として記録する。

use crate::error::{GuardError, Result};
use crate::scanner;
use std::cell::Cell;
use std::path::Path;
use upload_guard_common::{FormGuard, FormHost, SheetSummary, ValidationError, ValidationResult};

/// 標準出力に通知するホスト
#[derive(Default)]
pub struct ConsoleHost {
    quiet: bool,
    accepted: Cell<bool>,
}

impl ConsoleHost {
    /// 通知を出さないホスト（JSON出力用）
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Default::default()
        }
    }

    pub fn accepted(&self) -> bool {
        self.accepted.get()
    }
}

impl FormHost for ConsoleHost {
    fn notify(&self, error: &ValidationError) {
        if !self.quiet {
            println!("✗ {}", error);
            println!("  ({})", error.detail());
        }
    }

    fn submit(&self) {
        self.accepted.set(true);
    }
}

/// 1ファイルを検証
pub async fn check_file(
    guard: &FormGuard,
    host: &ConsoleHost,
    path: &Path,
    category: &str,
) -> Result<ValidationResult> {
    if !path.is_file() {
        return Err(GuardError::FileNotFound(path.display().to_string()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    tracing::debug!(file = %path.display(), category, "checking file");

    let result = guard
        .guard_submission(host, Some(&file_name), &[category], move || async move {
            tokio::fs::read(path).await.map_err(|e| e.to_string())
        })
        .await;

    Ok(result)
}

/// 必須シートの行数集計
pub async fn summarize_file(guard: &FormGuard, path: &Path) -> Result<Vec<SheetSummary>> {
    let bytes = tokio::fs::read(path).await?;
    let summaries = upload_guard_common::summarize(&bytes, &guard.rules().required_sheets)?;
    Ok(summaries)
}

/// フォルダ一括検証の集計
#[derive(Debug, Default)]
pub struct DirReport {
    pub passed: Vec<String>,
    pub failed: Vec<(String, Vec<ValidationError>)>,
}

impl DirReport {
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// フォルダ直下の全ファイルを順に検証
pub async fn check_dir(guard: &FormGuard, folder: &Path, category: &str) -> Result<DirReport> {
    let files = scanner::scan_folder(folder)?;
    let mut report = DirReport::default();

    for file in files {
        let host = ConsoleHost::quiet();
        let result = check_file(guard, &host, &file.path, category).await?;
        if host.accepted() {
            println!("✔ {}", file.file_name);
            report.passed.push(file.file_name);
        } else {
            let reason = result
                .errors
                .iter()
                .map(|e| e.detail())
                .collect::<Vec<_>>()
                .join("; ");
            println!("✗ {} - {}", file.file_name, reason);
            report.failed.push((file.file_name, result.errors));
        }
    }

    Ok(report)
}
