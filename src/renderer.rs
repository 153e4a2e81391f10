//! Markup rendering capability.

use crate::error::RenderError;

/// Converts lightweight markup into the hypertext the doc-tree parser expects.
///
/// One renderer is shared by every unit and call site of an environment, so
/// implementations must tolerate concurrent `render` calls. The interception
/// layer never serializes access on their behalf.
pub trait Renderer: Send + Sync {
    /// Renders `text`. Inline rendering omits block wrappers such as paragraphs.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the markup cannot be translated.
    fn render(&self, text: &str, inline: bool) -> Result<String, RenderError>;

    /// Releases engine resources. Called once, at environment teardown.
    fn cleanup(&self) {}
}

impl<F> Renderer for F
where
    F: Fn(&str, bool) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, text: &str, inline: bool) -> Result<String, RenderError> {
        self(text, inline)
    }
}
