//! HTTP surface: upload conversion, Markdown preview and the bundled UI.

mod assets;
pub mod error;
pub mod server;
pub mod upload;

pub use error::ApiError;
pub use server::{AppState, PreviewRequest, router, run, serve};
pub use upload::UploadError;
