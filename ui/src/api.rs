use gloo_net::http::Request;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ConvertMeta;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewRequest<'a> {
    markdown: &'a str,
    enable_gfm_extras: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub html: String,
    #[serde(default)]
    pub removed_unsafe: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ConvertResponse {
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub meta: Option<ConvertMeta>,
}

/// Pull `error` out of a JSON error body, falling back to `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_string))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Interpret a `/api/convert` response body.
pub fn parse_convert_response(ok: bool, body: &str) -> Result<ConvertResponse, String> {
    if !ok {
        return Err(error_message(body, "Conversion failed"));
    }
    let value: Value = serde_json::from_str(body).map_err(|e| format!("bad response: {e}"))?;
    if value.get("error").is_some() {
        return Err(error_message(body, "Conversion failed"));
    }
    serde_json::from_value(value).map_err(|e| format!("bad response: {e}"))
}

/// Interpret a `/api/preview` response body.
pub fn parse_preview_response(ok: bool, body: &str) -> Result<PreviewResponse, String> {
    if !ok {
        return Err(error_message(body, "Preview failed"));
    }
    serde_json::from_str(body).map_err(|e| format!("bad response: {e}"))
}

pub async fn render_preview(markdown: &str, enable_gfm_extras: bool) -> Result<PreviewResponse, String> {
    let response = Request::post("/api/preview")
        .json(&PreviewRequest {
            markdown,
            enable_gfm_extras,
        })
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let ok = response.ok();
    let body = response.text().await.map_err(|e| e.to_string())?;
    parse_preview_response(ok, &body)
}

pub async fn convert_file(file: &web_sys::File) -> Result<ConvertResponse, String> {
    let form = web_sys::FormData::new().map_err(|_| "FormData unavailable".to_string())?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(|_| "could not attach file".to_string())?;

    let response = Request::post("/api/convert")
        .body(form)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let ok = response.ok();
    let body = response.text().await.map_err(|e| e.to_string())?;
    parse_convert_response(ok, &body)
}
