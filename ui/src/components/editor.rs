use crate::actions;
use crate::state::AppState;
use leptos::prelude::*;

#[component]
pub fn Toolbar() -> impl IntoView {
    let state = use_context::<AppState>().expect("AppState in context");

    let convert_again = move |_| {
        if let Some(file) = state.last_file.get_value() {
            actions::convert(state, file);
        }
    };

    let toggle_live = move |_| {
        state.live_preview.update(|live| *live = !*live);
        if state.live_preview.get_untracked() {
            actions::render_now(state, state.markdown.get_untracked());
        }
    };

    let toggle_extras = move |ev: leptos::ev::Event| {
        state.gfm_extras.set(event_target_checked(&ev));
        if state.live_preview.get_untracked() {
            actions::render_now(state, state.markdown.get_untracked());
        }
    };

    view! {
        <div class="row">
            <button
                class="btn"
                data-testid="convert-again"
                prop:disabled=move || state.is_converting.get() || !state.last_file.with_value(Option::is_some)
                on:click=convert_again
            >
                {move || if state.is_converting.get() { "Converting…" } else { "Convert again" }}
            </button>
            <button class="btn secondary" on:click=toggle_live>
                {move || format!("Live preview: {}", if state.live_preview.get() { "ON" } else { "OFF" })}
            </button>
            <label class="toggle">
                <input
                    type="checkbox"
                    prop:checked=move || state.gfm_extras.get()
                    on:change=toggle_extras
                />
                "Enable task lists/strikethrough/autolink (GFM)"
            </label>
            <button
                class="btn secondary"
                prop:disabled=move || state.is_rendering.get()
                on:click=move |_| actions::render_now(state, state.markdown.get_untracked())
            >
                {move || if state.is_rendering.get() { "Rendering…" } else { "Render Preview" }}
            </button>
        </div>
    }
}

#[component]
pub fn Editor() -> impl IntoView {
    let state = use_context::<AppState>().expect("AppState in context");

    view! {
        <label class="hint" for="markdown">"Markdown (editable)"</label>
        <textarea
            id="markdown"
            class="editor"
            data-testid="markdown-editor"
            aria-label="Markdown editor"
            spellcheck="false"
            prop:value=move || state.markdown.get()
            on:input:target=move |ev| actions::edit(state, ev.target().value())
        ></textarea>
        <div class="row end">
            <button
                class="btn secondary"
                on:click=move |_| actions::copy(state, state.markdown.get_untracked(), "Markdown")
            >
                "Copy Markdown"
            </button>
            <button
                class="btn secondary"
                on:click=move |_| actions::copy(state, state.html.get_untracked(), "Rendered HTML")
            >
                "Copy HTML"
            </button>
            <button
                class="btn secondary"
                on:click=move |_| actions::download(state, &state.markdown.get_untracked(), "converted.md")
            >
                "Download .md"
            </button>
        </div>
    }
}
