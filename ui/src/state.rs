use leptos::prelude::*;
use serde::Deserialize;

/// Diagnostics kept in memory; older entries fall off the end.
pub const MAX_DIAGNOSTICS: usize = 12;
/// Diagnostics shown in the panel.
pub const VISIBLE_DIAGNOSTICS: usize = 10;
/// Matches the server's default upload ceiling.
pub const MAX_UPLOAD_BYTES: f64 = 2.5 * 1024.0 * 1024.0;

pub const SAMPLE_MARKDOWN: &str = "# Ready to convert

- Drop an .rtf file on the left or click to choose one
- Markdown appears in the editor
- Preview updates live (or manually)
- Copy / Download when you're happy

| Feature | Status |
| --- | --- |
| Tables | ✅ |
| Copy/Download | ✅ |
| Diagnostics | ✅ |";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub time: String,
}

/// Newest-first, bounded list of diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagnosticLog {
    items: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn push(&mut self, level: Level, message: impl Into<String>, time: impl Into<String>) {
        self.items.insert(
            0,
            Diagnostic {
                level,
                message: message.into(),
                time: time.into(),
            },
        );
        self.items.truncate(MAX_DIAGNOSTICS);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn visible(&self) -> &[Diagnostic] {
        &self.items[..self.items.len().min(VISIBLE_DIAGNOSTICS)]
    }
}

/// Conversion timing and sizes as reported by `/api/convert`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertMeta {
    pub ms: Option<f64>,
    pub bytes_in: Option<f64>,
    pub bytes_out: Option<f64>,
}

impl ConvertMeta {
    /// `"42 ms • in 1.5 KB • out 0.7 KB"`
    pub fn status_line(&self) -> String {
        let ms = self
            .ms
            .map(|ms| format!("{ms:.0} ms"))
            .unwrap_or_else(|| "—".to_string());
        format!(
            "{ms} • in {} • out {}",
            format_kb(self.bytes_in),
            format_kb(self.bytes_out)
        )
    }
}

pub fn format_kb(bytes: Option<f64>) -> String {
    match bytes {
        Some(n) => format!("{:.1} KB", n / 1024.0),
        None => "—".to_string(),
    }
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub markdown: RwSignal<String>,
    pub html: RwSignal<String>,
    pub live_preview: RwSignal<bool>,
    pub gfm_extras: RwSignal<bool>,
    pub is_rendering: RwSignal<bool>,
    pub is_converting: RwSignal<bool>,
    pub diagnostics: RwSignal<DiagnosticLog>,
    pub stderr: RwSignal<Option<String>>,
    pub meta: RwSignal<Option<ConvertMeta>>,
    pub last_file: StoredValue<Option<web_sys::File>, LocalStorage>,
    /// Bumped on every edit; a pending debounced render only fires if it
    /// still holds the latest value.
    pub edit_seq: StoredValue<u64>,
    /// Bumped on every render request; responses for older requests are
    /// dropped.
    pub render_seq: StoredValue<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            markdown: RwSignal::new(SAMPLE_MARKDOWN.to_string()),
            html: RwSignal::new(String::new()),
            live_preview: RwSignal::new(true),
            gfm_extras: RwSignal::new(false),
            is_rendering: RwSignal::new(false),
            is_converting: RwSignal::new(false),
            diagnostics: RwSignal::new(DiagnosticLog::default()),
            stderr: RwSignal::new(None),
            meta: RwSignal::new(None),
            last_file: StoredValue::new_local(None),
            edit_seq: StoredValue::new(0),
            render_seq: StoredValue::new(0),
        }
    }

    pub fn add_diag(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Error => log::error!("{message}"),
            Level::Warn => log::warn!("{message}"),
            Level::Info => log::info!("{message}"),
        }
        let time = crate::browser::local_time();
        self.diagnostics
            .update(|log| log.push(level, message, time));
    }

    pub fn next_edit(&self) -> u64 {
        self.edit_seq.update_value(|seq| *seq += 1);
        self.edit_seq.get_value()
    }

    pub fn next_render(&self) -> u64 {
        self.render_seq.update_value(|seq| *seq += 1);
        self.render_seq.get_value()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
