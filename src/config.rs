//! Markup rendering options.

use anyhow::{Result, bail};
use clap::Args;

/// Default CSS class prefix for highlighted code spans.
pub const DEFAULT_HIGHLIGHT_PREFIX: &str = "hljs-";

/// Rendering options for [`MarkdownRenderer`](crate::MarkdownRenderer).
///
/// Derives [`clap::Args`] so a doc tool can flatten these flags into its own
/// command line.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct RenderOptions {
    /// Disable GitHub Flavored Markdown extensions (tables, strikethrough, autolinks, task lists)
    #[arg(long = "markup-no-gfm")]
    pub no_gfm: bool,

    /// Keep straight quotes and double dashes as written
    #[arg(long = "markup-no-smart")]
    pub no_smart: bool,

    /// Escape raw HTML in comments instead of passing it through
    #[arg(long = "markup-safe")]
    pub safe: bool,

    /// Skip syntax highlighting of fenced code blocks
    #[arg(long = "markup-no-highlight")]
    pub no_highlight: bool,

    /// CSS class prefix for highlighted code spans
    #[arg(long = "markup-highlight-prefix", default_value = DEFAULT_HIGHLIGHT_PREFIX)]
    pub highlight_prefix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            no_gfm: false,
            no_smart: false,
            safe: false,
            no_highlight: false,
            highlight_prefix: DEFAULT_HIGHLIGHT_PREFIX.to_string(),
        }
    }
}

impl RenderOptions {
    /// Validates options.
    ///
    /// # Errors
    ///
    /// Returns error if the highlight prefix is empty or contains whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.no_highlight {
            return Ok(());
        }

        if self.highlight_prefix.is_empty() {
            bail!("Highlight class prefix must not be empty");
        }

        if self.highlight_prefix.chars().any(char::is_whitespace) {
            bail!(
                "Highlight class prefix contains whitespace: {:?}",
                self.highlight_prefix
            );
        }

        Ok(())
    }
}
