pub mod diagnostics;
pub mod dropzone;
pub mod editor;
pub mod preview;
