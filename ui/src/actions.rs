use gloo_timers::future::TimeoutFuture;
use log::debug;
use leptos::prelude::*;

use crate::api;
use crate::state::{AppState, Level, MAX_UPLOAD_BYTES};

const RENDER_DEBOUNCE_MS: u32 = 350;

/// Render `markdown` now. Only the newest request's result is applied.
pub fn render_now(state: AppState, markdown: String) {
    let seq = state.next_render();
    let extras = state.gfm_extras.get_untracked();
    state.is_rendering.set(true);

    wasm_bindgen_futures::spawn_local(async move {
        let result = api::render_preview(&markdown, extras).await;
        if state.render_seq.get_value() != seq {
            debug!("dropping stale preview (seq={seq})");
            return;
        }
        match result {
            Ok(preview) => {
                state.html.set(preview.html);
                if preview.removed_unsafe > 0 {
                    state.add_diag(
                        Level::Warn,
                        format!("Sanitizer removed {} unsafe node(s).", preview.removed_unsafe),
                    );
                }
            }
            Err(e) => state.add_diag(Level::Error, format!("Preview render failed: {e}")),
        }
        state.is_rendering.set(false);
    });
}

/// Render after the editor has been quiet for a moment.
pub fn render_debounced(state: AppState, markdown: String) {
    let seq = state.next_edit();
    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(RENDER_DEBOUNCE_MS).await;
        if state.edit_seq.get_value() == seq {
            render_now(state, markdown);
        }
    });
}

pub fn edit(state: AppState, markdown: String) {
    state.markdown.set(markdown.clone());
    if state.live_preview.get_untracked() {
        render_debounced(state, markdown);
    }
}

pub fn convert(state: AppState, file: web_sys::File) {
    state.last_file.set_value(Some(file.clone()));
    if file.size() > MAX_UPLOAD_BYTES {
        state.add_diag(Level::Error, "File exceeds 2.5 MB guardrail.");
        return;
    }

    state.is_converting.set(true);
    wasm_bindgen_futures::spawn_local(async move {
        match api::convert_file(&file).await {
            Ok(converted) => {
                state.markdown.set(converted.markdown.clone());
                state.stderr.set(converted.stderr.filter(|s| !s.is_empty()));
                state.meta.set(converted.meta);
                for warning in converted.warnings {
                    state.add_diag(Level::Warn, warning);
                }
                state.add_diag(Level::Info, format!("Converted {}", file.name()));
                if state.live_preview.get_untracked() {
                    render_now(state, converted.markdown);
                }
            }
            Err(e) => state.add_diag(Level::Error, e),
        }
        state.is_converting.set(false);
    });
}

pub fn copy(state: AppState, text: String, label: &'static str) {
    wasm_bindgen_futures::spawn_local(async move {
        match crate::browser::copy_to_clipboard(&text).await {
            Ok(()) => state.add_diag(Level::Info, format!("{label} copied to clipboard.")),
            Err(e) => state.add_diag(Level::Error, e),
        }
    });
}

pub fn download(state: AppState, text: &str, filename: &str) {
    match crate::browser::download_text(text, filename) {
        Ok(()) => state.add_diag(Level::Info, format!("Downloaded {filename}")),
        Err(e) => state.add_diag(Level::Error, e),
    }
}
