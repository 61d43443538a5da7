use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("{0}件のファイルが検証に失敗しました")]
    Rejected(usize),

    #[error(transparent)]
    Common(#[from] upload_guard_common::Error),
}

impl From<rust_xlsxwriter::XlsxError> for GuardError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        GuardError::ExcelGeneration(e.to_string())
    }
}

impl From<upload_guard_common::ValidationError> for GuardError {
    fn from(e: upload_guard_common::ValidationError) -> Self {
        GuardError::Common(e.into())
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
