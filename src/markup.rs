//! Markdown rendering for doc comments with GitHub Flavored Markdown support.
//!
//! This module provides a comrak based [`Renderer`](crate::Renderer) that
//! understands the shape of doc comments: the main description renders as
//! block content while block tags stay tags for the doc-tree parser.

mod renderer;
mod tags;

pub use renderer::MarkdownRenderer;
pub use tags::{BlockTag, DocComment};
