use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::debug;

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded.")]
    MissingFile,
    #[error("Only .rtf files are supported.")]
    UnsupportedType,
    #[error("File is too large. Max {} MB for browser conversion.", megabytes(.limit))]
    TooLarge { limit: u64 },
    #[error("Malformed upload: {0}")]
    Malformed(String),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// `2621440` → `"2.5"`, `1048576` → `"1"`.
fn megabytes(bytes: &u64) -> String {
    let mb = *bytes as f64 / (1024.0 * 1024.0);
    let text = format!("{mb:.1}");
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

pub fn has_rtf_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".rtf")
}

/// An accepted upload.
#[derive(Debug, Clone)]
pub struct RtfUpload {
    pub file_name: String,
    pub text: String,
}

/// Pull the RTF document out of a multipart form.
///
/// Fields other than `file` are skipped. The extension is checked before any
/// content is read, and the size limit is enforced while streaming: once the
/// limit is passed the rest of the field is drained without being kept.
/// Content is decoded as UTF-8, replacing invalid sequences.
pub async fn read_rtf_upload(
    multipart: &mut Multipart,
    max_bytes: u64,
) -> Result<RtfUpload, UploadError> {
    loop {
        let Some(mut field) = multipart.next_field().await.map_err(malformed)? else {
            return Err(UploadError::MissingFile);
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A plain form value under `file` is not a file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(UploadError::MissingFile);
        };
        if !has_rtf_extension(&file_name) {
            return Err(UploadError::UnsupportedType);
        }

        let mut content = Vec::new();
        let mut received: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| malformed_or_large(e, max_bytes))? {
            received += chunk.len() as u64;
            if received <= max_bytes {
                content.extend_from_slice(&chunk);
            }
        }
        if received > max_bytes {
            debug!(file = %file_name, received, max_bytes, "upload over limit");
            return Err(UploadError::TooLarge { limit: max_bytes });
        }

        return Ok(RtfUpload {
            file_name,
            text: String::from_utf8_lossy(&content).into_owned(),
        });
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> UploadError {
    UploadError::Malformed(err.body_text())
}

// The framework's body limit surfaces as a multipart error with status 413.
fn malformed_or_large(err: axum::extract::multipart::MultipartError, max_bytes: u64) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { limit: max_bytes }
    } else {
        malformed(err)
    }
}
