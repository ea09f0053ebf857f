use crate::components::hooks::use_stickybits;
use crate::config::StickyOptions;
use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;

/// A `div` that sticks inside its parent while the page scrolls.
#[component]
pub fn Sticky(
    #[prop(into, optional)] class: String,
    #[prop(optional)] options: StickyOptions,
    children: Children,
) -> impl IntoView {
    let node_ref: NodeRef<html::Div> = NodeRef::new();
    let state_classes = options.use_sticky_classes;
    use_stickybits(node_ref, options);

    let merged_class = tw_merge!("z-10", class);

    view! {
        <div
            data-name="Sticky"
            data-state-classes=state_classes.to_string()
            node_ref=node_ref
            class=merged_class
        >
            {children()}
        </div>
    }
}
