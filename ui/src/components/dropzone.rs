use crate::actions;
use crate::state::AppState;
use leptos::html::Input;
use leptos::prelude::*;

#[component]
pub fn Dropzone() -> impl IntoView {
    let state = use_context::<AppState>().expect("AppState in context");
    let input_ref: NodeRef<Input> = NodeRef::new();
    let is_over = RwSignal::new(false);

    let take_first = move |files: Option<web_sys::FileList>| {
        if let Some(file) = files.and_then(|list| list.get(0)) {
            actions::convert(state, file);
        }
    };

    let on_click = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_dragover = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        if !state.is_converting.get_untracked() {
            is_over.set(true);
        }
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        is_over.set(false);
        if state.is_converting.get_untracked() {
            return;
        }
        take_first(ev.data_transfer().and_then(|dt| dt.files()));
    };

    let class = move || {
        if is_over.get() {
            "dropzone dragover"
        } else {
            "dropzone"
        }
    };

    view! {
        <div
            class=class
            role="button"
            aria-label="Upload RTF"
            data-testid="dropzone"
            on:click=on_click
            on:dragover=on_dragover
            on:dragleave=move |_| is_over.set(false)
            on:drop=on_drop
        >
            <input
                node_ref=input_ref
                type="file"
                accept=".rtf,application/rtf"
                prop:disabled=move || state.is_converting.get()
                on:click=|ev| ev.stop_propagation()
                on:change:target=move |ev| {
                    let input = ev.target();
                    take_first(input.files());
                    // Allow picking the same file again.
                    input.set_value("");
                }
            />
            <div class="label">
                {move || {
                    if state.is_converting.get() {
                        "Converting…"
                    } else {
                        "Drop .rtf here or click to choose"
                    }
                }}
            </div>
            <div class="hint">"Only .rtf files. Max 2.5 MB."</div>
        </div>
    }
}
