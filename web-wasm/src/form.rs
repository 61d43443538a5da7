//! フォーム送信ガード（ブラウザ側）
//!
//! 同期チェックは `validateForm` の中で即座に行い、ファイル内容の検査は
//! `spawn_local` で非同期に実行する。ネイティブ送信は常に抑止し、
//! 全チェック通過時のみ `forms[0].submit()` を呼ぶ。

use crate::dom;
use std::cell::Cell;
use upload_guard_common::{FormGuard, FormHost, ValidationError};
use wasm_bindgen::prelude::*;
use web_sys::HtmlFormElement;

thread_local! {
    // 読み込み中の二重送信を防ぐ
    static IN_FLIGHT: Cell<bool> = const { Cell::new(false) };
}

/// alert と forms[0] を持つDOMホスト
struct DomFormHost {
    form: HtmlFormElement,
}

impl FormHost for DomFormHost {
    fn notify(&self, error: &ValidationError) {
        gloo::console::log!(format!("validation failed: {}", error.detail()));
        gloo::dialogs::alert(&error.to_string());
    }

    fn submit(&self) {
        if let Err(e) = self.form.submit() {
            gloo::console::error!(e);
        }
    }
}

/// `<form onsubmit="return validateForm()">` から呼ばれる
///
/// 送信は非同期コールバック側で行うため常に false を返す。
#[wasm_bindgen(js_name = validateForm)]
pub fn validate_form() -> bool {
    gloo::console::log!("validateForm called");

    if IN_FLIGHT.with(Cell::get) {
        gloo::console::log!("validateForm ignored: file read in progress");
        return false;
    }

    if let Err(e) = start_validation() {
        gloo::console::error!(e);
    }
    false
}

fn start_validation() -> Result<(), JsValue> {
    let document = dom::document()?;
    let form = dom::first_form(&document)?;
    let guard = FormGuard::new(dom::rules_from_attribute(form.get_attribute(dom::RULES_ATTRIBUTE)));

    let file = dom::selected_file(&document)?;
    let file_name = file.as_ref().map(|f| f.name());
    let checked = dom::checked_categories(&dom::radio_buttons(&document)?);
    let checked_refs: Vec<&str> = checked.iter().map(String::as_str).collect();

    // 同期フェーズの失敗はここで打ち切る（読み込みを開始しない）
    if let Err(e) = guard.validate(file_name.as_deref(), &checked_refs) {
        DomFormHost { form }.notify(&e);
        return Ok(());
    }

    let Some(file) = file else {
        return Ok(());
    };

    IN_FLIGHT.with(|f| f.set(true));
    wasm_bindgen_futures::spawn_local(async move {
        let host = DomFormHost { form };
        let checked_refs: Vec<&str> = checked.iter().map(String::as_str).collect();
        let blob = gloo::file::File::from(file);
        let blob = &blob;

        let result = guard
            .guard_submission(&host, file_name.as_deref(), &checked_refs, move || async move {
                gloo::file::futures::read_as_bytes(blob)
                    .await
                    .map_err(|e| e.to_string())
            })
            .await;

        gloo::console::log!(format!("validation finished: submitted={}", result.submitted));
        IN_FLIGHT.with(|f| f.set(false));
    });

    Ok(())
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use gloo::timers::future::TimeoutFuture;
    use js_sys::{Array, Function, Reflect};
    use wasm_bindgen_test::*;
    use web_sys::{DataTransfer, Document, File, HtmlInputElement};

    wasm_bindgen_test_configure!(run_in_browser);

    const UPLOAD_FORM: &str = r#"<form action="/upload" method="post">
        <input type="file" id="input_file">
        <input type="radio" id="radio_pl1" name="fav_language" value="PL1" checked>
        <input type="radio" id="radio_xxxx" name="fav_language" value="XXXX">
        <input type="hidden" id="selected_radio_id">
    </form>"#;

    /// alert を記録用の関数に差し替え、フォームを描き直す
    fn setup() -> Document {
        let window = web_sys::window().expect("window");
        let record = Function::new_with_args("message", "window.__alerts.push(message);");
        Reflect::set(&window, &"__alerts".into(), &Array::new()).expect("alerts");
        Reflect::set(&window, &"alert".into(), &record).expect("alert stub");

        let document = dom::document().expect("document");
        document.body().expect("body").set_inner_html(UPLOAD_FORM);
        document
    }

    fn alerts() -> Vec<String> {
        let window = web_sys::window().expect("window");
        let recorded: Array = Reflect::get(&window, &"__alerts".into())
            .expect("alerts")
            .dyn_into()
            .expect("array");
        recorded.iter().filter_map(|m| m.as_string()).collect()
    }

    fn select_file(document: &Document, name: &str, content: &str) {
        let parts = Array::of1(&content.into());
        let file = File::new_with_str_sequence(&parts, name).expect("file");
        let transfer = DataTransfer::new().expect("data transfer");
        transfer.items().add_with_file(&file).expect("add file");

        let input: HtmlInputElement = document
            .get_element_by_id(dom::FILE_INPUT_ID)
            .expect("file input")
            .dyn_into()
            .expect("input");
        input.set_files(transfer.files().as_ref());
    }

    #[wasm_bindgen_test]
    fn wasm_validate_form_without_file_alerts_and_does_not_read() {
        setup();

        assert!(!validate_form());

        assert!(!IN_FLIGHT.with(Cell::get));
        assert_eq!(alerts(), vec!["Please select an Excel file."]);
    }

    #[wasm_bindgen_test]
    fn wasm_validate_form_rejects_csv_synchronously() {
        let document = setup();
        select_file(&document, "report_KCP1.csv", "a,b");

        assert!(!validate_form());

        assert!(!IN_FLIGHT.with(Cell::get));
        assert_eq!(alerts(), vec!["Invalid file type. Please upload an Excel file."]);
    }

    #[wasm_bindgen_test]
    fn wasm_validate_form_keyword_mismatch_stops_before_read() {
        let document = setup();
        select_file(&document, "report_XXXX.xlsx", "not a workbook");

        assert!(!validate_form());

        assert!(!IN_FLIGHT.with(Cell::get));
        assert_eq!(
            alerts(),
            vec!["Invalid file name. Please select the correct radio button for the file."]
        );
    }

    #[wasm_bindgen_test]
    async fn wasm_validate_form_ignores_resubmit_while_reading() {
        let document = setup();
        select_file(&document, "report_KCP1.xlsx", "not a workbook");

        assert!(!validate_form());
        assert!(IN_FLIGHT.with(Cell::get));
        // 読み込み中の再送信は何もしない
        assert!(!validate_form());

        for _ in 0..100 {
            if !IN_FLIGHT.with(Cell::get) {
                break;
            }
            TimeoutFuture::new(10).await;
        }

        assert!(!IN_FLIGHT.with(Cell::get));
        assert_eq!(
            alerts(),
            vec!["The Excel file could not be read. Please check the file."]
        );
    }
}
