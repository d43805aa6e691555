use crate::actions;
use crate::components::diagnostics::Diagnostics;
use crate::components::dropzone::Dropzone;
use crate::components::editor::{Editor, Toolbar};
use crate::components::preview::Preview;
use crate::state::AppState;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(state);

    // Initial render of the sample document.
    actions::render_now(state, state.markdown.get_untracked());

    view! {
        <style>{STYLES}</style>
        <header class="app-header">
            <h1>"RTF → Markdown"</h1>
            <p class="hint">"CommonMark + pipe tables with sanitized preview."</p>
        </header>
        <main class="app">
            <section class="panel stack" aria-label="Upload and Markdown">
                <Dropzone/>
                <Toolbar/>
                <Editor/>
            </section>
            <section class="panel stack" aria-label="Preview and diagnostics">
                <Preview/>
                <Diagnostics/>
            </section>
        </main>
    }
}

const STYLES: &str = r#"
    * {
        margin: 0;
        padding: 0;
        box-sizing: border-box;
    }

    body {
        background: #1a1a2e;
        color: #e0e0e0;
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
        min-height: 100vh;
    }

    .app-header {
        display: flex;
        align-items: baseline;
        gap: 16px;
        padding: 12px 16px;
        border-bottom: 1px solid #2a2a4a;
    }

    .app-header h1 {
        font-size: 1.1rem;
        font-weight: 600;
        color: #8888cc;
    }

    .app {
        display: grid;
        grid-template-columns: 1fr 1fr;
        gap: 16px;
        padding: 16px;
        max-width: 1400px;
        margin: 0 auto;
    }

    @media (max-width: 900px) {
        .app {
            grid-template-columns: 1fr;
        }
    }

    .panel {
        background: #222240;
        border: 1px solid #2a2a4a;
        border-radius: 12px;
        padding: 16px;
        min-width: 0;
    }

    .stack {
        display: flex;
        flex-direction: column;
        gap: 12px;
    }

    .row {
        display: flex;
        flex-wrap: wrap;
        align-items: center;
        gap: 8px;
    }

    .row.spread {
        justify-content: space-between;
    }

    .row.end {
        justify-content: flex-end;
    }

    .hint {
        color: #888;
        font-size: 0.85rem;
    }

    .dropzone {
        border: 2px dashed #3a3a5a;
        border-radius: 12px;
        padding: 24px;
        text-align: center;
        cursor: pointer;
    }

    .dropzone input {
        display: none;
    }

    .dropzone.dragover {
        border-color: #5a7aca;
        background: #2a2a4e;
    }

    .dropzone .label {
        color: #aaaadd;
        margin-bottom: 4px;
    }

    .btn {
        background: #3a5aaa;
        color: #e0e8ff;
        border: none;
        border-radius: 8px;
        padding: 8px 14px;
        font-size: 0.9rem;
        cursor: pointer;
    }

    .btn:hover:not(:disabled) {
        background: #4a6abb;
    }

    .btn.secondary {
        background: #2a2a4a;
        color: #c0c0e0;
    }

    .btn:disabled {
        opacity: 0.4;
        cursor: not-allowed;
    }

    .toggle {
        display: flex;
        align-items: center;
        gap: 6px;
        font-size: 0.85rem;
        color: #c0c0e0;
    }

    .editor {
        width: 100%;
        min-height: 420px;
        background: #1a1a2e;
        color: #e0e0e0;
        border: 1px solid #3a3a5a;
        border-radius: 8px;
        padding: 10px 12px;
        font-family: "JetBrains Mono", "Fira Code", monospace;
        font-size: 0.9rem;
        resize: vertical;
        outline: none;
    }

    .editor:focus {
        border-color: #5a5a8a;
    }

    .preview {
        background: #f8f8fc;
        color: #1a1a2e;
        border-radius: 8px;
        padding: 16px;
        min-height: 420px;
        overflow: auto;
        line-height: 1.5;
    }

    .preview h1, .preview h2, .preview h3 {
        margin: 0.6em 0 0.4em;
    }

    .preview p, .preview ul, .preview ol, .preview blockquote, .preview pre, .preview table {
        margin: 0.5em 0;
    }

    .preview ul, .preview ol {
        padding-left: 1.5em;
    }

    .preview table {
        border-collapse: collapse;
    }

    .preview th, .preview td {
        border: 1px solid #ccccdd;
        padding: 4px 8px;
    }

    .preview pre {
        background: #111122;
        color: #e0e0e0;
        padding: 10px;
        border-radius: 6px;
        overflow-x: auto;
    }

    .preview code {
        font-family: "JetBrains Mono", "Fira Code", monospace;
        font-size: 0.9em;
    }

    .preview blockquote {
        border-left: 3px solid #ccccdd;
        padding-left: 10px;
        color: #555;
    }

    .status-line {
        display: flex;
        align-items: center;
        gap: 6px;
        font-size: 0.85rem;
        color: #888;
    }

    .status-dot {
        width: 8px;
        height: 8px;
        border-radius: 50%;
        background: #44bb66;
    }

    .diag-list {
        display: flex;
        flex-direction: column;
        gap: 6px;
    }

    .diag {
        display: grid;
        grid-template-columns: 60px 1fr auto;
        gap: 8px;
        padding: 6px 10px;
        border-radius: 6px;
        font-size: 0.85rem;
        background: #2a2a3e;
    }

    .diag .tag {
        text-transform: uppercase;
        font-weight: 600;
    }

    .diag .time {
        color: #888;
    }

    .diag .pre {
        white-space: pre-wrap;
    }

    .diag.info .tag {
        color: #88aadd;
    }

    .diag.warn {
        background: #3a3320;
    }

    .diag.warn .tag {
        color: #ddbb55;
    }

    .diag.error {
        background: #4a1a1a;
    }

    .diag.error .tag {
        color: #ff8888;
    }
"#;
