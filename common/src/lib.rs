//! Upload Guard Common Library
//!
//! CLIとWeb(WASM)で共有される検証ルールと送信ガード

pub mod analysis;
pub mod error;
pub mod guard;
pub mod mirror;
pub mod rules;
pub mod workbook;

pub use analysis::{analyze, AnalysisRow, AnalysisTable, CellValue, MEASUREMENT_COLUMNS};
pub use error::{Error, Result, ValidationError};
pub use guard::{CheckedUpload, FormGuard, FormHost, ValidationResult};
pub use mirror::{mirrored_value, HiddenField, RadioMirror, RadioOption};
pub use rules::{GuardRules, KeywordCheck, KeywordRule, RequiredSheetSet};
pub use workbook::{sheet_names, summarize, SheetSummary};
