use crate::config::StickyOptions;
use crate::registry::{Stickybits, Target};
use crate::web::WebDom;
use leptos::logging::warn;
use leptos::prelude::*;
use web_sys::HtmlElement;

/// Access to the registration owned by [`use_stickybits`].
#[derive(Clone, Copy)]
pub struct StickyHandle {
    inner: StoredValue<Option<Stickybits<WebDom>>, LocalStorage>,
}

impl StickyHandle {
    /// True once the element has mounted and been registered.
    pub fn is_registered(&self) -> bool {
        self.inner
            .try_with_value(|sb| sb.is_some())
            .unwrap_or(false)
    }

    /// Re-measure after a layout change the scroll listener can't see.
    pub fn refresh(&self) {
        let _ = self.inner.try_with_value(|sb| {
            if let Some(sb) = sb {
                sb.refresh();
            }
        });
    }

    pub fn cleanup(&self) {
        // No-op once the owner is disposed.
        let _ = self.inner.try_update_value(|sb| {
            if let Some(mut sb) = sb.take() {
                sb.cleanup();
            }
        });
    }
}

/// Hook that makes the element behind `node_ref` sticky once it mounts.
///
/// The registration is rebuilt if the node is replaced, and torn down with
/// the owning component.
pub fn use_stickybits(node_ref: NodeRef<leptos::html::Div>, options: StickyOptions) -> StickyHandle {
    let handle = StickyHandle {
        inner: StoredValue::new_local(None),
    };

    Effect::new(move |_| {
        let Some(el) = node_ref.get() else {
            return;
        };
        handle.cleanup();

        let el: HtmlElement = el.into();
        match Stickybits::register(WebDom::new(), Target::Element(el), options.clone()) {
            Ok(sb) => {
                let _ = handle.inner.try_update_value(|slot| *slot = Some(sb));
            }
            Err(e) => warn!("stickybits: {e}"),
        }
    });

    on_cleanup(move || handle.cleanup());

    handle
}
