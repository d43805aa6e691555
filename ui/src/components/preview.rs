use crate::state::AppState;
use leptos::prelude::*;

/// Sanitized HTML from the server, injected as-is.
#[component]
pub fn Preview() -> impl IntoView {
    let state = use_context::<AppState>().expect("AppState in context");

    view! {
        <div class="stack">
            <div class="hint">"Rendered preview (sanitized)"</div>
            <div
                class="preview"
                aria-live="polite"
                data-testid="preview"
                inner_html=move || state.html.get()
            ></div>
        </div>
    }
}
