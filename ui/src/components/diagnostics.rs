use crate::state::AppState;
use leptos::prelude::*;

#[component]
pub fn Diagnostics() -> impl IntoView {
    let state = use_context::<AppState>().expect("AppState in context");
    let open = RwSignal::new(true);

    let status_line = move || {
        state.meta.get().map(|meta| {
            view! {
                <div class="status-line">
                    <span class="status-dot"></span>
                    <span>{meta.status_line()}</span>
                </div>
            }
        })
    };

    let stderr = move || {
        state.stderr.get().map(|stderr| {
            view! {
                <div class="diag error">
                    <span class="tag">"stderr"</span>
                    <span class="msg pre">{stderr}</span>
                    <span class="time">"engine"</span>
                </div>
            }
        })
    };

    let entries = move || {
        let log = state.diagnostics.get();
        if log.is_empty() {
            return view! { <div class="hint">"No diagnostics yet."</div> }.into_any();
        }
        log.visible()
            .iter()
            .cloned()
            .map(|d| {
                view! {
                    <div class=format!("diag {}", d.level.as_str())>
                        <span class="tag">{d.level.as_str()}</span>
                        <span class="msg">{d.message}</span>
                        <span class="time">{d.time}</span>
                    </div>
                }
            })
            .collect::<Vec<_>>()
            .into_any()
    };

    view! {
        <div class="stack" data-testid="diagnostics">
            <div class="row spread">
                <div class="hint">"Diagnostics"</div>
                <button class="btn secondary" on:click=move |_| open.update(|o| *o = !*o)>
                    {move || if open.get() { "Hide" } else { "Show" }}
                </button>
            </div>
            {status_line}
            {move || {
                open.get().then(|| view! {
                    {stderr}
                    <div class="diag-list">{entries}</div>
                })
            }}
        </div>
    }
}
