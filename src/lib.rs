//! `position: sticky` emulation for the browser.
//!
//! Elements registered through [`Stickybits`] move between an in-flow
//! default state, a sticky state pinned to the viewport edge, and a stuck
//! state parked at the bottom of their parent as the page (or a custom
//! scroll container) scrolls. When the browser supports native sticky
//! positioning and no state classes are requested, the browser does the
//! work and nothing listens for scroll events.

pub mod components;
pub mod config;
pub mod dom;
pub mod error;
pub mod offsets;
pub mod registry;
pub mod schedule;
pub mod state;
pub mod support;
pub mod web;

pub use components::{use_stickybits, Sticky, StickyHandle};
pub use config::{ScrollSource, StickyConfig, StickyOptions, VerticalEdge};
pub use dom::{Dom, ScrollContainer};
pub use error::{StickyError, StickyErrorKind, StickyResult};
pub use registry::{Stickybits, Target};
pub use state::{StickyInstance, StickyState};
pub use support::StickyPosition;
pub use web::WebDom;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// JS-facing registration returned by `stickybits(target, options)`.
#[wasm_bindgen]
pub struct StickybitsHandle {
    inner: Stickybits<WebDom>,
}

#[wasm_bindgen]
impl StickybitsHandle {
    /// Re-measure every instance, e.g. after content above them changed height.
    pub fn refresh(&self) {
        self.inner.refresh();
    }

    /// Stop listening and put every touched element back the way it was.
    pub fn cleanup(&mut self) {
        self.inner.cleanup();
    }

    /// Number of elements driven by scroll events (0 when native sticky is used).
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }
}

fn to_js_error(e: StickyError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

/// Accepts a selector string, a single element, or anything array-like
/// (`NodeList`, `HTMLCollection`, arrays).
fn target_from_js(value: &JsValue) -> StickyResult<Target<HtmlElement>> {
    if let Some(selector) = value.as_string() {
        return Ok(Target::Selector(selector));
    }
    if let Some(el) = value.dyn_ref::<HtmlElement>() {
        return Ok(Target::Element(el.clone()));
    }
    if value.is_object() {
        let has_length = js_sys::Reflect::get(value, &"length".into())
            .ok()
            .and_then(|len| len.as_f64())
            .is_some();
        if has_length {
            let elements = js_sys::Array::from(value)
                .iter()
                .filter_map(|item| item.dyn_into::<HtmlElement>().ok())
                .collect();
            return Ok(Target::Collection(elements));
        }
    }
    Err(StickyError::invalid(
        "target must be a selector, an element or a list of elements",
    ))
}

fn options_from_js(value: &JsValue) -> StickyResult<StickyOptions> {
    if value.is_undefined() || value.is_null() {
        return Ok(StickyOptions::default());
    }
    let json = js_sys::JSON::stringify(value).map_err(|e| StickyError::dom("could not read options", e))?;
    StickyOptions::from_json(&String::from(json))
}

/// `stickybits(target, options?)` for plain JS callers.
#[wasm_bindgen(js_name = stickybits)]
pub fn stickybits_js(target: JsValue, options: JsValue) -> Result<StickybitsHandle, JsValue> {
    console_error_panic_hook::set_once();

    let target = target_from_js(&target).map_err(to_js_error)?;
    let options = options_from_js(&options).map_err(to_js_error)?;
    let inner = Stickybits::register(WebDom::new(), target, options).map_err(to_js_error)?;
    Ok(StickybitsHandle { inner })
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_js_options_object_is_read() {
        let opts = js_sys::Object::new();
        js_sys::Reflect::set(&opts, &"stickyBitStickyOffset".into(), &JsValue::from_f64(12.0))
            .expect("should set property");
        js_sys::Reflect::set(&opts, &"useStickyClasses".into(), &JsValue::TRUE)
            .expect("should set property");

        let parsed = options_from_js(&opts.into()).expect("options should parse");
        assert_eq!(parsed.sticky_bit_sticky_offset, 12.0);
        assert!(parsed.use_sticky_classes);
    }

    #[wasm_bindgen_test]
    fn test_missing_options_use_defaults() {
        let parsed = options_from_js(&JsValue::UNDEFINED).expect("undefined means defaults");
        assert_eq!(parsed, StickyOptions::default());
    }

    #[wasm_bindgen_test]
    fn test_targets_from_js_values() {
        assert!(matches!(
            target_from_js(&JsValue::from_str(".sticky")),
            Ok(Target::Selector(s)) if s == ".sticky"
        ));
        assert!(matches!(
            target_from_js(&js_sys::Array::new().into()),
            Ok(Target::Collection(v)) if v.is_empty()
        ));
        assert!(target_from_js(&JsValue::from_f64(3.0)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_entry_point_with_unmatched_selector() {
        let mut handle = stickybits_js(JsValue::from_str(".no-such-element"), JsValue::NULL)
            .expect("empty registrations are valid");
        assert_eq!(handle.length(), 0);
        handle.cleanup();
    }

    #[wasm_bindgen_test]
    fn test_entry_point_rejects_bad_options() {
        let opts = js_sys::Object::new();
        js_sys::Reflect::set(&opts, &"verticalPosition".into(), &"left".into())
            .expect("should set property");
        assert!(stickybits_js(JsValue::from_str(".x"), opts.into()).is_err());
    }
}
