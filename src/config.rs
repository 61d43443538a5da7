use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use upload_guard_common::GuardRules;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub rules: GuardRules,
}

impl Config {
    /// 指定パスから読み込み。ファイルが無ければ既定値
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.rules.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.rules.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GuardError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("upload-guard").join("config.json"))
    }

    /// `CAT=KEYWORD` 形式のキーワードルールを適用
    pub fn set_keyword(&mut self, spec: &str) -> Result<()> {
        let (category, keyword) = spec
            .split_once('=')
            .map(|(c, k)| (c.trim(), k.trim()))
            .filter(|(c, k)| !c.is_empty() && !k.is_empty())
            .ok_or_else(|| GuardError::Config(format!("CAT=KEYWORD の形式で指定してください: {}", spec)))?;
        self.rules.set_keyword(category, keyword);
        Ok(())
    }

    pub fn remove_keyword(&mut self, category: &str) -> Result<()> {
        if !self.rules.remove_keyword(category) {
            return Err(GuardError::Config(format!("未登録のカテゴリ: {}", category)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upload_guard_common::KeywordCheck;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_keyword("PL2=KCP2").unwrap();
        config.rules.keyword_check = KeywordCheck::AfterRead;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.rules.rule_for("PL2").unwrap().keyword, "KCP2");
    }

    #[test]
    fn test_load_rejects_invalid_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"rules": {"keyword_rules": []}}"#).unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(GuardError::Common(_))));
    }

    #[test]
    fn test_set_keyword_format() {
        let mut config = Config::default();
        assert!(config.set_keyword("PL1").is_err());
        assert!(config.set_keyword("=KCP1").is_err());
        config.set_keyword(" PL1 = KCP9 ").unwrap();
        assert_eq!(config.rules.rule_for("PL1").unwrap().keyword, "KCP9");
    }

    #[test]
    fn test_remove_keyword() {
        let mut config = Config::default();
        config.remove_keyword("XXXX").unwrap();
        assert!(matches!(config.remove_keyword("XXXX"), Err(GuardError::Config(_))));
    }
}
