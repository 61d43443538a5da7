//! 検証ルール定義
//!
//! カテゴリ（ラジオボタン）とファイル名キーワードの対応、許可拡張子、
//! 必須シートをまとめた静的な設定。CLIとWeb(WASM)で共有する。

use crate::error::{Error, Result, ValidationError};
use serde::{Deserialize, Serialize};

/// 許可する拡張子（既定）
pub const DEFAULT_EXTENSION: &str = ".xlsx";

/// デコーダ（calamine）が開ける拡張子
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".xlsx", ".xlsm", ".xlsb", ".xls", ".ods"];

/// 必須シート（既定）
pub const DEFAULT_REQUIRED_SHEETS: &[&str] = &["Samples", "High Controls"];

/// カテゴリ → ファイル名に含まれるべきキーワード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: String,
    pub keyword: String,
}

impl KeywordRule {
    pub fn new(category: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            keyword: keyword.into(),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.contains(&self.keyword)
    }
}

/// キーワード検査のタイミング
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordCheck {
    /// ファイル読み込み前に打ち切る
    #[default]
    BeforeRead,
    /// 読み込みとシート検査は続行し、送信だけ止める
    AfterRead,
}

impl std::str::FromStr for KeywordCheck {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before-read" | "before" => Ok(KeywordCheck::BeforeRead),
            "after-read" | "after" => Ok(KeywordCheck::AfterRead),
            _ => Err(format!("Unknown keyword check: {}. Use before-read or after-read", s)),
        }
    }
}

impl std::fmt::Display for KeywordCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeywordCheck::BeforeRead => write!(f, "before-read"),
            KeywordCheck::AfterRead => write!(f, "after-read"),
        }
    }
}

/// 必須シートの集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredSheetSet(Vec<String>);

impl RequiredSheetSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheets: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !sheets.contains(&name) {
                sheets.push(name);
            }
        }
        Self(sheets)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `sheet_names` に無い必須シートを宣言順で返す
    pub fn missing_from<S: AsRef<str>>(&self, sheet_names: &[S]) -> Vec<String> {
        self.0
            .iter()
            .filter(|required| !sheet_names.iter().any(|s| s.as_ref() == required.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for RequiredSheetSet {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_SHEETS.iter().copied())
    }
}

/// 検証ルール一式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardRules {
    pub accepted_extensions: Vec<String>,
    pub keyword_rules: Vec<KeywordRule>,
    pub required_sheets: RequiredSheetSet,
    pub keyword_check: KeywordCheck,
}

impl Default for GuardRules {
    fn default() -> Self {
        Self {
            accepted_extensions: vec![DEFAULT_EXTENSION.to_string()],
            keyword_rules: vec![KeywordRule::new("PL1", "KCP1"), KeywordRule::new("XXXX", "XXXX")],
            required_sheets: RequiredSheetSet::default(),
            keyword_check: KeywordCheck::default(),
        }
    }
}

impl GuardRules {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// 設定値の整合性チェック
    pub fn validate(&self) -> Result<()> {
        if self.accepted_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(Error::Config("accepted_extensions is empty".into()));
        }
        for ext in self.accepted_extensions.iter().map(|e| normalize_extension(e)) {
            if !ext.is_empty() && !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(Error::Config(format!("unsupported extension: {}", ext)));
            }
        }
        if self.required_sheets.is_empty() {
            return Err(Error::Config("required_sheets is empty".into()));
        }
        if self.keyword_rules.is_empty() {
            return Err(Error::Config("keyword_rules is empty".into()));
        }
        for rule in &self.keyword_rules {
            if rule.category.trim().is_empty() || rule.keyword.is_empty() {
                return Err(Error::Config(format!(
                    "invalid keyword rule: '{}' -> '{}'",
                    rule.category, rule.keyword
                )));
            }
        }
        Ok(())
    }

    /// 設定済みカテゴリ一覧（宣言順）
    pub fn categories(&self) -> Vec<&str> {
        self.keyword_rules.iter().map(|r| r.category.as_str()).collect()
    }

    pub fn rule_for(&self, category: &str) -> Option<&KeywordRule> {
        self.keyword_rules.iter().find(|r| r.category == category)
    }

    /// 拡張子チェック（大文字小文字は区別しない）
    pub fn is_accepted_file(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.accepted_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| !ext.is_empty())
            .any(|ext| lower.ends_with(&ext))
    }

    /// キーワードルールを追加または置換
    pub fn set_keyword(&mut self, category: &str, keyword: &str) {
        match self.keyword_rules.iter_mut().find(|r| r.category == category) {
            Some(rule) => rule.keyword = keyword.to_string(),
            None => self.keyword_rules.push(KeywordRule::new(category, keyword)),
        }
    }

    /// キーワードルールを削除。削除した場合は true
    pub fn remove_keyword(&mut self, category: &str) -> bool {
        let before = self.keyword_rules.len();
        self.keyword_rules.retain(|r| r.category != category);
        self.keyword_rules.len() != before
    }
}

/// 小文字化し、先頭の "." を補う（空文字はそのまま）
fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// チェックされたラジオボタン群から、ちょうど1つのカテゴリを決定する
///
/// ルールの有無はここでは見ない。未登録カテゴリはキーワード不一致として扱う。
pub fn single_category<'a>(checked: &[&'a str]) -> std::result::Result<&'a str, ValidationError> {
    match checked {
        [] => Err(ValidationError::NoCategorySelected),
        [one] => Ok(*one),
        many => Err(ValidationError::AmbiguousCategory {
            checked: many.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = GuardRules::default();
        assert_eq!(rules.categories(), vec!["PL1", "XXXX"]);
        assert_eq!(rules.rule_for("PL1").map(|r| r.keyword.as_str()), Some("KCP1"));
        assert_eq!(rules.required_sheets.names(), &["Samples", "High Controls"]);
        assert_eq!(rules.keyword_check, KeywordCheck::BeforeRead);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_is_accepted_file() {
        let rules = GuardRules::default();
        assert!(rules.is_accepted_file("report_KCP1.xlsx"));
        assert!(rules.is_accepted_file("REPORT_KCP1.XLSX"));
        assert!(!rules.is_accepted_file("report.csv"));
        assert!(!rules.is_accepted_file("report.xls"));
        assert!(!rules.is_accepted_file("report.xlsx.csv"));
        // 拡張子だけのファイル名も endsWith と同じく通す
        assert!(rules.is_accepted_file(".xlsx"));
    }

    #[test]
    fn test_extension_without_leading_dot() {
        let rules = GuardRules {
            accepted_extensions: vec!["xlsm".into()],
            ..Default::default()
        };
        assert!(rules.is_accepted_file("macro.xlsm"));
        assert!(!rules.is_accepted_file("macroxlsm"));
    }

    #[test]
    fn test_keyword_rule_is_case_sensitive() {
        let rule = KeywordRule::new("PL1", "KCP1");
        assert!(rule.matches("LC2-032_KCP1 pHL-YEMK DC 20231030.xlsx"));
        assert!(!rule.matches("lc2-032_kcp1.xlsx"));
    }

    #[test]
    fn test_missing_from_keeps_declared_order() {
        let sheets = RequiredSheetSet::default();
        assert!(sheets.missing_from(&["Notes", "High Controls", "Samples"]).is_empty());
        assert_eq!(sheets.missing_from(&["Samples"]), vec!["High Controls".to_string()]);
        let none: [&str; 0] = [];
        assert_eq!(sheets.missing_from(&none), vec!["Samples".to_string(), "High Controls".to_string()]);
    }

    #[test]
    fn test_required_sheet_set_dedups() {
        let sheets = RequiredSheetSet::new(["Samples", "Samples", "High Controls"]);
        assert_eq!(sheets.names().len(), 2);
    }

    #[test]
    fn test_single_category() {
        assert_eq!(single_category(&["PL1"]), Ok("PL1"));
        assert_eq!(single_category(&["UNKNOWN"]), Ok("UNKNOWN"));
        assert_eq!(single_category(&[]), Err(ValidationError::NoCategorySelected));
        assert!(matches!(
            single_category(&["PL1", "XXXX"]),
            Err(ValidationError::AmbiguousCategory { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_undecodable_extension() {
        let rules = GuardRules {
            accepted_extensions: vec![".csv".into()],
            ..Default::default()
        };
        assert!(matches!(rules.validate(), Err(Error::Config(_))));

        let rules = GuardRules {
            accepted_extensions: vec!["XLSX".into(), "ods".into()],
            ..Default::default()
        };
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_set_and_remove_keyword() {
        let mut rules = GuardRules::default();
        rules.set_keyword("PL2", "KCP2");
        rules.set_keyword("PL1", "KCP1B");
        assert_eq!(rules.categories(), vec!["PL1", "XXXX", "PL2"]);
        assert_eq!(rules.rule_for("PL1").unwrap().keyword, "KCP1B");

        assert!(rules.remove_keyword("XXXX"));
        assert!(!rules.remove_keyword("XXXX"));
        assert_eq!(rules.categories(), vec!["PL1", "PL2"]);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let rules = GuardRules::from_json(r#"{"keyword_check": "after-read"}"#).unwrap();
        assert_eq!(rules.keyword_check, KeywordCheck::AfterRead);
        assert_eq!(rules.categories(), vec!["PL1", "XXXX"]);
    }

    #[test]
    fn test_from_json_rejects_empty_sheets() {
        let result = GuardRules::from_json(r#"{"required_sheets": []}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut rules = GuardRules::default();
        rules.set_keyword("PL2", "KCP2");
        let json = serde_json::to_string(&rules).unwrap();
        assert!(json.contains("\"required_sheets\":[\"Samples\",\"High Controls\"]"));
        assert_eq!(GuardRules::from_json(&json).unwrap(), rules);
    }

    #[test]
    fn test_keyword_check_from_str() {
        assert_eq!("after-read".parse::<KeywordCheck>(), Ok(KeywordCheck::AfterRead));
        assert_eq!("BEFORE".parse::<KeywordCheck>(), Ok(KeywordCheck::BeforeRead));
        assert!("never".parse::<KeywordCheck>().is_err());
    }
}
