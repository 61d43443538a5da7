//! ラジオボタン選択の隠しフィールドへの反映
//!
//! 「現在チェックされている選択肢」→「隠しフィールドの値」の純粋関数と、
//! change イベントごとに再評価する小さな状態。

/// ラジオボタン1つ分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioOption {
    pub id: String,
    pub checked: bool,
}

impl RadioOption {
    pub fn new(id: impl Into<String>, checked: bool) -> Self {
        Self {
            id: id.into(),
            checked,
        }
    }
}

/// チェックされている選択肢のIDを返す（最初の1つ）
pub fn mirrored_value(options: &[RadioOption]) -> Option<&str> {
    options.iter().find(|o| o.checked).map(|o| o.id.as_str())
}

/// 隠しフィールド
pub trait HiddenField {
    fn set_value(&self, value: &str);
}

/// ラジオボタン群と隠しフィールドの同期
#[derive(Debug, Clone, Default)]
pub struct RadioMirror {
    value: Option<String>,
}

impl RadioMirror {
    /// 初期化時: 既定でチェックされている選択肢のIDを反映する
    pub fn init(options: &[RadioOption], field: &impl HiddenField) -> Self {
        let mut mirror = Self::default();
        mirror.sync(options, field);
        mirror
    }

    /// change イベント時: 新しくチェックされた選択肢のIDを反映する
    pub fn on_change(&mut self, changed_id: &str, field: &impl HiddenField) {
        self.value = Some(changed_id.to_string());
        field.set_value(changed_id);
    }

    /// 現在の選択状態から再計算して反映する
    pub fn sync(&mut self, options: &[RadioOption], field: &impl HiddenField) {
        if let Some(id) = mirrored_value(options) {
            self.value = Some(id.to_string());
            field.set_value(id);
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
