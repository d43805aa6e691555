//! rtfmark: convert RTF documents to Markdown and render sanitized previews.

pub mod config;
pub mod convert;
pub mod engine;
pub mod gateway;
pub mod preview;
