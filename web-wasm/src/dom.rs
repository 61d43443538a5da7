//! DOM契約
//!
//! ページ側が用意する要素:
//! - `input_file`: type=file の入力
//! - `fav_language`: カテゴリのラジオボタン群（各要素に一意のID）
//! - `selected_radio_id`: 隠しフィールド
//! - `document.forms[0]`: 送信対象のフォーム

use upload_guard_common::{GuardRules, HiddenField, RadioOption};
use wasm_bindgen::prelude::*;
use web_sys::{Document, File, HtmlFormElement, HtmlInputElement};

pub const FILE_INPUT_ID: &str = "input_file";
pub const RADIO_GROUP: &str = "fav_language";
pub const HIDDEN_FIELD_ID: &str = "selected_radio_id";

/// フォームに埋め込むルール上書き（JSON）
pub const RULES_ATTRIBUTE: &str = "data-guard-rules";

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document is not available"))
}

fn input_by_id(document: &Document, id: &str) -> Result<HtmlInputElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("#{} not found", id)))?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| JsValue::from_str(&format!("#{} is not an input", id)))
}

/// 選択中のファイル（未選択なら None）
pub fn selected_file(document: &Document) -> Result<Option<File>, JsValue> {
    let input = input_by_id(document, FILE_INPUT_ID)?;
    Ok(input.files().and_then(|files| files.get(0)))
}

/// カテゴリのラジオボタン一覧
pub fn radio_buttons(document: &Document) -> Result<Vec<HtmlInputElement>, JsValue> {
    let nodes = document.query_selector_all(&format!("input[name=\"{}\"]", RADIO_GROUP))?;
    let mut radios = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        if let Some(input) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()) {
            radios.push(input);
        }
    }
    Ok(radios)
}

/// チェック済みラジオボタンの value 一覧
pub fn checked_categories(radios: &[HtmlInputElement]) -> Vec<String> {
    radios.iter().filter(|r| r.checked()).map(|r| r.value()).collect()
}

pub fn radio_options(radios: &[HtmlInputElement]) -> Vec<RadioOption> {
    radios.iter().map(|r| RadioOption::new(r.id(), r.checked())).collect()
}

pub fn first_form(document: &Document) -> Result<HtmlFormElement, JsValue> {
    document
        .forms()
        .item(0)
        .ok_or_else(|| JsValue::from_str("no form on the page"))?
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| JsValue::from_str("forms[0] is not a form"))
}

/// フォームの `data-guard-rules` からルールを決める
pub fn rules_from_attribute(attribute: Option<String>) -> GuardRules {
    match attribute {
        Some(json) => match GuardRules::from_json(&json) {
            Ok(rules) => rules,
            Err(e) => {
                gloo::console::warn!(format!("{} ignored: {}", RULES_ATTRIBUTE, e));
                GuardRules::default()
            }
        },
        None => GuardRules::default(),
    }
}

/// 隠しフィールド
pub struct HiddenInput(pub HtmlInputElement);

impl HiddenInput {
    pub fn find(document: &Document) -> Result<Self, JsValue> {
        input_by_id(document, HIDDEN_FIELD_ID).map(Self)
    }
}

impl HiddenField for HiddenInput {
    fn set_value(&self, value: &str) {
        self.0.set_value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upload_guard_common::KeywordCheck;

    #[test]
    fn test_rules_from_attribute_missing() {
        assert_eq!(rules_from_attribute(None), GuardRules::default());
    }

    #[test]
    fn test_rules_from_attribute_override() {
        let rules = rules_from_attribute(Some(r#"{"keyword_check": "after-read"}"#.to_string()));
        assert_eq!(rules.keyword_check, KeywordCheck::AfterRead);
    }
}
