//! Rendering utilities for human-facing surfaces (Markdown summaries).

#![forbid(unsafe_code)]

mod markdown;
mod model;

pub use markdown::render_markdown;
pub use model::{RenderableError, RenderableIndicator, RenderableReport};
