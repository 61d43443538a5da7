//! ラジオボタン → 隠しフィールドの同期（ブラウザ側）

use crate::dom::{self, HiddenInput};
use gloo::events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use upload_guard_common::RadioMirror;
use wasm_bindgen::prelude::*;
use web_sys::Document;

/// 初期値を反映し、各ラジオボタンの change を購読する
pub fn install(document: &Document) -> Result<(), JsValue> {
    let radios = dom::radio_buttons(document)?;
    let field = Rc::new(HiddenInput::find(document)?);
    let mirror = Rc::new(RefCell::new(RadioMirror::init(&dom::radio_options(&radios), &*field)));

    for radio in &radios {
        let mirror = Rc::clone(&mirror);
        let field = Rc::clone(&field);
        let id = radio.id();
        EventListener::new(radio, "change", move |_| {
            mirror.borrow_mut().on_change(&id, &*field);
        })
        .forget();
    }

    Ok(())
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::{Event, HtmlInputElement};

    wasm_bindgen_test_configure!(run_in_browser);

    const RADIO_FORM: &str = r#"<form>
        <input type="radio" id="radio_pl1" name="fav_language" value="PL1">
        <input type="radio" id="radio_xxxx" name="fav_language" value="XXXX" checked>
        <input type="hidden" id="selected_radio_id">
    </form>"#;

    fn setup() -> Document {
        let document = dom::document().expect("document");
        document.body().expect("body").set_inner_html(RADIO_FORM);
        document
    }

    fn input(document: &Document, id: &str) -> HtmlInputElement {
        document
            .get_element_by_id(id)
            .expect("element")
            .dyn_into()
            .expect("input")
    }

    #[wasm_bindgen_test]
    fn wasm_install_mirrors_default_checked_radio() {
        let document = setup();

        install(&document).expect("install");

        assert_eq!(input(&document, dom::HIDDEN_FIELD_ID).value(), "radio_xxxx");
    }

    #[wasm_bindgen_test]
    fn wasm_change_event_updates_hidden_field() {
        let document = setup();
        install(&document).expect("install");

        let pl1 = input(&document, "radio_pl1");
        pl1.set_checked(true);
        let change = Event::new("change").expect("event");
        pl1.dispatch_event(&change).expect("dispatch");

        assert_eq!(input(&document, dom::HIDDEN_FIELD_ID).value(), "radio_pl1");
    }

    #[wasm_bindgen_test]
    fn wasm_install_without_hidden_field_fails() {
        let document = dom::document().expect("document");
        document
            .body()
            .expect("body")
            .set_inner_html(r#"<input type="radio" id="radio_pl1" name="fav_language" value="PL1">"#);

        assert!(install(&document).is_err());
    }
}
