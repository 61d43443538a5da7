//! カテゴリ対話式選択モジュール
//!
//! `--category` 省略時にラジオボタン相当の選択肢を出す。

use crate::error::{GuardError, Result};
use dialoguer::Select;
use upload_guard_common::GuardRules;

/// 表示用ラベル（例: "PL1 (KCP1)"）
pub fn category_labels(rules: &GuardRules) -> Vec<String> {
    rules
        .keyword_rules
        .iter()
        .map(|r| format!("{} ({})", r.category, r.keyword))
        .collect()
}

/// 指定があればそれを、無ければ対話で1つ選ぶ
pub fn resolve_category(rules: &GuardRules, category: Option<String>) -> Result<String> {
    if let Some(category) = category {
        return Ok(category);
    }

    let categories = rules.categories();
    if let [only] = categories.as_slice() {
        return Ok(only.to_string());
    }

    let index = Select::new()
        .with_prompt("カテゴリを選択してください")
        .items(&category_labels(rules))
        .default(0)
        .interact()
        .map_err(|e| GuardError::Prompt(e.to_string()))?;

    Ok(categories[index].to_string())
}
