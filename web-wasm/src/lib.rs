//! Upload Guard browser binding (WASM)
//!
//! 既存のアップロードフォームに送信ガードとラジオボタン同期を取り付ける。

mod dom;
mod form;
mod mirror;

pub use form::validate_form;

use gloo::events::EventListener;
use wasm_bindgen::prelude::*;
use web_sys::Document;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    let document = match dom::document() {
        Ok(document) => document,
        Err(e) => {
            gloo::console::error!(e);
            return;
        }
    };

    // DOM構築前に読み込まれた場合は DOMContentLoaded を待つ
    if document.ready_state() == "loading" {
        let target = document.clone();
        EventListener::once(&target, "DOMContentLoaded", move |_| install(&document)).forget();
    } else {
        install(&document);
    }
}

fn install(document: &Document) {
    if let Err(e) = mirror::install(document) {
        gloo::console::error!(e);
    }
}
