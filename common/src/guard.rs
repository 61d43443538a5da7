//! アップロードフォームの送信ガード
//!
//! 2段階検証:
//! - Phase1 (同期): ファイル有無・拡張子・カテゴリ・ファイル名キーワード
//! - Phase2 (非同期): 読み込んだバイト列から必須シートの有無を確認
//!
//! 両フェーズの結果を明示的に合成し、すべて通った場合に限り一度だけ送信する。

use crate::error::ValidationError;
use crate::rules::{self, GuardRules, KeywordCheck};
use crate::workbook;
use serde::Serialize;
use std::future::Future;

/// フォームを持つホスト（ブラウザDOM、CLIなど）
pub trait FormHost {
    /// 失敗理由をユーザーに通知する（ブラウザではブロッキングalert）
    fn notify(&self, error: &ValidationError);

    /// フォームを送信する
    fn submit(&self);
}

/// Phase1を通過したアップロード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedUpload {
    pub file_name: String,
    pub category: String,
    /// `KeywordCheck::AfterRead` で保留されたキーワード不一致
    pub deferred: Option<ValidationError>,
}

/// 検証結果（可否と理由）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub file_name: Option<String>,
    pub category: Option<String>,
    pub sheet_names: Vec<String>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ValidationError>,
    pub submitted: bool,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// 表示用の理由。成功時は None
    pub fn reason(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn rejected(mut self, host: &impl FormHost, error: ValidationError) -> Self {
        tracing::debug!(kind = error.kind(), detail = %error.detail(), "upload rejected");
        host.notify(&error);
        self.errors.push(error);
        self
    }
}

#[derive(Serialize)]
struct ErrorEntry {
    kind: &'static str,
    message: String,
    detail: String,
}

fn serialize_errors<S>(errors: &[ValidationError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(errors.len()))?;
    for e in errors {
        seq.serialize_element(&ErrorEntry {
            kind: e.kind(),
            message: e.to_string(),
            detail: e.detail(),
        })?;
    }
    seq.end()
}

/// 送信ガード本体
#[derive(Debug, Clone, Default)]
pub struct FormGuard {
    rules: GuardRules,
}

impl FormGuard {
    pub fn new(rules: GuardRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GuardRules {
        &self.rules
    }

    /// Phase1: 同期チェック
    ///
    /// `checked` はチェック済みラジオボタンの値。ちょうど1つでなければエラー。
    pub fn validate(&self, file_name: Option<&str>, checked: &[&str]) -> Result<CheckedUpload, ValidationError> {
        let file_name = match file_name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ValidationError::MissingFile),
        };

        if !self.rules.is_accepted_file(file_name) {
            return Err(ValidationError::InvalidFileType {
                file_name: file_name.to_string(),
            });
        }

        let category = rules::single_category(checked)?;
        let rule = self.rules.rule_for(category);

        // 未登録カテゴリはどのファイル名にも一致しない
        let mut deferred = None;
        if !rule.is_some_and(|r| r.matches(file_name)) {
            let mismatch = ValidationError::KeywordMismatch {
                category: category.to_string(),
                keyword: rule.map(|r| r.keyword.clone()).unwrap_or_default(),
                file_name: file_name.to_string(),
            };
            match self.rules.keyword_check {
                KeywordCheck::BeforeRead => return Err(mismatch),
                KeywordCheck::AfterRead => deferred = Some(mismatch),
            }
        }

        Ok(CheckedUpload {
            file_name: file_name.to_string(),
            category: category.to_string(),
            deferred,
        })
    }

    /// Phase2: 読み込んだバイト列に必須シートが揃っているか
    ///
    /// 成功時はブック内のシート名一覧を返す。
    pub fn validate_contents(&self, bytes: &[u8]) -> Result<Vec<String>, ValidationError> {
        let names = workbook::sheet_names(bytes)?;
        let missing = self.rules.required_sheets.missing_from(&names);
        if !missing.is_empty() {
            return Err(ValidationError::MissingSheet { missing });
        }
        Ok(names)
    }

    /// 両フェーズを実行し、すべて通れば `host.submit()` を一度だけ呼ぶ
    ///
    /// `read` はPhase1通過後にのみ呼ばれる単発の読み込み。キャンセル・
    /// タイムアウト・リトライは行わない。
    pub async fn guard_submission<H, F, Fut>(
        &self,
        host: &H,
        file_name: Option<&str>,
        checked: &[&str],
        read: F,
    ) -> ValidationResult
    where
        H: FormHost,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, String>>,
    {
        tracing::debug!(?file_name, ?checked, "guard_submission called");

        let mut result = ValidationResult {
            file_name: file_name.map(str::to_string),
            category: match checked {
                [one] => Some(one.to_string()),
                _ => None,
            },
            ..Default::default()
        };

        let upload = match self.validate(file_name, checked) {
            Ok(upload) => upload,
            Err(e) => return result.rejected(host, e),
        };

        if let Some(mismatch) = upload.deferred {
            result = result.rejected(host, mismatch);
        }

        let bytes = match read().await {
            Ok(bytes) => bytes,
            Err(reason) => return result.rejected(host, ValidationError::UnreadableFile { reason }),
        };
        tracing::debug!(file = %upload.file_name, size = bytes.len(), "file read completed");

        match self.validate_contents(&bytes) {
            Ok(names) => result.sheet_names = names,
            Err(e) => return result.rejected(host, e),
        }

        if result.is_valid() {
            host.submit();
            result.submitted = true;
        }
        result
    }
}
