//! Rendered substitute for a raw comment.

use crate::error::RenderError;
use crate::host::{Comment, CommentStyle};
use crate::renderer::Renderer;

/// Immutable comment whose text has already been rendered to hypertext.
///
/// Style and deprecation mirror the comment it replaces. Source positions
/// are not carried over: rendering reshapes the text, so
/// [`source_pos`](Comment::source_pos) always reports `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedComment {
    text: String,
    style: CommentStyle,
    deprecated: bool,
}

impl RenderedComment {
    /// Pairs rendered `text` with the metadata of `original`.
    pub fn new(text: impl Into<String>, original: &dyn Comment) -> Self {
        Self {
            text: text.into(),
            style: original.style(),
            deprecated: original.is_deprecated(),
        }
    }

    /// Renders `original` as block content.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error unchanged.
    pub fn render<R>(original: &dyn Comment, renderer: &R) -> Result<Self, RenderError>
    where
        R: Renderer + ?Sized,
    {
        let text = renderer.render(original.text(), false)?;
        Ok(Self::new(text, original))
    }
}

impl Comment for RenderedComment {
    fn text(&self) -> &str {
        &self.text
    }

    fn style(&self) -> CommentStyle {
        self.style
    }

    fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    fn source_pos(&self, _index: usize) -> Option<usize> {
        None
    }

    fn is_rendered(&self) -> bool {
        true
    }
}
