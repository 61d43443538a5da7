//! エラー型定義
//!
//! `ValidationError` の `Display` はそのままユーザー向けアラート文言になる。
//! 診断用の詳細は `detail()` で取得する。

use thiserror::Error;

/// アップロード検証の失敗種別
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select an Excel file.")]
    MissingFile,

    #[error("Invalid file type. Please upload an Excel file.")]
    InvalidFileType { file_name: String },

    #[error("Please select the file category.")]
    NoCategorySelected,

    #[error("Please select only one file category.")]
    AmbiguousCategory { checked: Vec<String> },

    #[error("Invalid file name. Please select the correct radio button for the file.")]
    KeywordMismatch {
        category: String,
        keyword: String,
        file_name: String,
    },

    #[error("The Excel file is missing required sheets. Please check the contents.")]
    MissingSheet { missing: Vec<String> },

    #[error("The Excel file could not be read. Please check the file.")]
    UnreadableFile { reason: String },
}

impl ValidationError {
    /// ログ・CLI表示用の詳細メッセージ
    pub fn detail(&self) -> String {
        match self {
            ValidationError::MissingFile => "no file selected".to_string(),
            ValidationError::InvalidFileType { file_name } => {
                format!("'{}' does not have an accepted spreadsheet extension", file_name)
            }
            ValidationError::NoCategorySelected => "no category selected".to_string(),
            ValidationError::AmbiguousCategory { checked } => {
                format!("multiple categories selected: {}", checked.join(", "))
            }
            ValidationError::KeywordMismatch { category, keyword, .. } if keyword.is_empty() => {
                format!("no keyword rule for category {}", category)
            }
            ValidationError::KeywordMismatch { category, keyword, file_name } => format!(
                "'{}' does not contain keyword '{}' required by category {}",
                file_name, keyword, category
            ),
            ValidationError::MissingSheet { missing } => {
                format!("missing sheets: {}", missing.join(", "))
            }
            ValidationError::UnreadableFile { reason } => format!("unreadable workbook: {}", reason),
        }
    }

    /// 短い種別名（JSON出力用）
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingFile => "missing_file",
            ValidationError::InvalidFileType { .. } => "invalid_file_type",
            ValidationError::NoCategorySelected => "no_category_selected",
            ValidationError::AmbiguousCategory { .. } => "ambiguous_category",
            ValidationError::KeywordMismatch { .. } => "keyword_mismatch",
            ValidationError::MissingSheet { .. } => "missing_sheet",
            ValidationError::UnreadableFile { .. } => "unreadable_file",
        }
    }
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error: {}", .0.detail())]
    Validation(#[from] ValidationError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
