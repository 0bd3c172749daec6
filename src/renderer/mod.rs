//! HTML preview renderer
//!
//! Renders the scenes of a [`CompileResult`](crate::CompileResult) as nested
//! flex boxes, one labelled box per runtime node.

pub mod config;
pub mod html;

pub use config::PreviewConfig;
pub use html::{escape_html, render_preview_html};
