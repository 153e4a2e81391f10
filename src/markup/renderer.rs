//! Markdown doc comment rendering with GitHub Flavored Markdown support.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use comrak::Options;
use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::trace;

use super::DocComment;
use crate::config::{DEFAULT_HIGHLIGHT_PREFIX, RenderOptions};
use crate::error::RenderError;
use crate::lock::{rw_read, rw_write};
use crate::renderer::Renderer;

/// Renders markdown doc comments to HTML.
///
/// The main description is rendered as block content. Block tags
/// (`@param`, `@return`, ...) are kept as tags for the doc-tree parser with
/// their descriptions rendered inline. Fenced code is highlighted with
/// syntect using CSS classes.
///
/// Safe to share between threads: comrak options are built per call and
/// the syntax set is only read while rendering.
pub struct MarkdownRenderer {
    options: RenderOptions,
    class_prefix: &'static str,
    syntax_set: RwLock<Option<Arc<SyntaxSet>>>,
    closed: AtomicBool,
}

impl MarkdownRenderer {
    /// Creates renderer with GitHub Flavored Markdown options.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Creates renderer with explicit options.
    ///
    /// Syntax definitions are loaded only when highlighting is enabled.
    pub fn with_options(options: RenderOptions) -> Self {
        let syntax_set = if options.no_highlight {
            None
        } else {
            Some(Arc::new(SyntaxSet::load_defaults_newlines()))
        };

        let class_prefix = intern_prefix(&options.highlight_prefix);

        Self {
            options,
            class_prefix,
            syntax_set: RwLock::new(syntax_set),
            closed: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Builds comrak options from the rendering options.
    fn comrak_options(&self) -> Options<'static> {
        let mut options = Options::default();

        if !self.options.no_gfm {
            options.extension.strikethrough = true;
            options.extension.table = true;
            options.extension.autolink = true;
            options.extension.tasklist = true;
            options.extension.footnotes = true;
            options.extension.description_lists = true;
        }

        options.parse.smart = !self.options.no_smart;

        // Doc comments are trusted source; raw HTML is passed through unless asked otherwise
        options.render.unsafe_ = !self.options.safe;
        options.render.escape = self.options.safe;

        options
    }

    /// Renders markdown content to HTML as block content.
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting fails
    fn render_block(&self, content: &str) -> Result<String, RenderError> {
        if content.trim().is_empty() {
            return Ok(String::new());
        }

        let html = comrak::markdown_to_html(content, &self.comrak_options());

        let syntax_set = rw_read(&self.syntax_set, "markdown.syntax_set").clone();
        match syntax_set {
            Some(syntax_set) => self.highlight_code_blocks(&html, &syntax_set),
            None if self.options.no_highlight => Ok(html),
            // Released by a cleanup that raced with this render
            None => Err(RenderError::Closed),
        }
    }

    /// Renders markdown content without its paragraph wrapper.
    ///
    /// Content spanning several blocks is returned as rendered.
    fn render_inline(&self, content: &str) -> Result<String, RenderError> {
        let html = self.render_block(content)?;
        let trimmed = html.trim_end();

        match trimmed
            .strip_prefix("<p>")
            .and_then(|inner| inner.strip_suffix("</p>"))
        {
            Some(inner) if !inner.contains("<p>") => Ok(inner.to_string()),
            _ => Ok(trimmed.to_string()),
        }
    }

    /// Post-processes HTML to apply syntax highlighting with CSS classes.
    ///
    /// Finds code blocks with language-* classes from comrak's output and
    /// replaces the plain text content with syntect highlighted HTML.
    fn highlight_code_blocks(
        &self,
        html: &str,
        syntax_set: &SyntaxSet,
    ) -> Result<String, RenderError> {
        let mut result = String::with_capacity(html.len());
        let mut last_end = 0;

        // Pattern: <code class="language-LANG">CODE</code>
        let mut search_pos = 0;

        while let Some(code_start) = html[search_pos..].find("<code class=\"language-") {
            let code_start = search_pos + code_start;

            let lang_start = code_start + "<code class=\"language-".len();
            let lang_end = match html[lang_start..].find('"') {
                Some(pos) => lang_start + pos,
                None => {
                    search_pos = code_start + 1;
                    continue;
                }
            };

            let language = &html[lang_start..lang_end];

            let content_start = match html[lang_end..].find('>') {
                Some(pos) => lang_end + pos + 1,
                None => {
                    search_pos = code_start + 1;
                    continue;
                }
            };

            let content_end = match html[content_start..].find("</code>") {
                Some(pos) => content_start + pos,
                None => {
                    search_pos = code_start + 1;
                    continue;
                }
            };

            // Comrak escapes &, <, >, " inside code blocks
            let decoded_content = html_decode(&html[content_start..content_end]);

            result.push_str(&html[last_end..code_start]);

            let highlighted = self.highlight_code(&decoded_content, language, syntax_set)?;

            result.push_str("<code class=\"language-");
            result.push_str(language);
            result.push_str("\">");
            result.push_str(&highlighted);
            result.push_str("</code>");

            last_end = content_end + "</code>".len();
            search_pos = last_end;
        }

        result.push_str(&html[last_end..]);

        Ok(result)
    }

    /// Highlights code with syntect using CSS classes.
    ///
    /// Unknown languages fall back to escaped plain text.
    fn highlight_code(
        &self,
        code: &str,
        language: &str,
        syntax_set: &SyntaxSet,
    ) -> Result<String, RenderError> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let syntax = syntax_set
            .find_syntax_by_token(language)
            .or_else(|| syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            return Ok(html_escape(code));
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            syntax_set,
            ClassStyle::SpacedPrefixed {
                prefix: self.class_prefix,
            },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| RenderError::Highlight {
                    language: language.to_string(),
                    reason: err.to_string(),
                })?;
        }

        Ok(generator.finalize())
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str, inline: bool) -> Result<String, RenderError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RenderError::Closed);
        }
        trace!(bytes = text.len(), inline, "Rendering markdown");

        let comment = DocComment::parse(text)?;

        let mut parts = Vec::with_capacity(comment.tags.len() + 1);
        let body = if inline {
            self.render_inline(&comment.body)?
        } else {
            self.render_block(&comment.body)?
        };
        let body = body.trim_end();
        if !body.is_empty() {
            parts.push(body.to_string());
        }

        for tag in &comment.tags {
            let content = self.render_inline(&tag.content)?;
            if content.is_empty() {
                parts.push(format!("@{}", tag.name));
            } else {
                parts.push(format!("@{} {}", tag.name, content));
            }
        }

        Ok(parts.join("\n"))
    }

    fn cleanup(&self) {
        self.closed.store(true, Ordering::Release);
        rw_write(&self.syntax_set, "markdown.cleanup").take();
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Custom class prefixes, leaked once each since syntect wants `&'static str`.
static CLASS_PREFIXES: Lazy<RwLock<HashSet<&'static str>>> =
    Lazy::new(|| RwLock::new(HashSet::new()));

fn intern_prefix(prefix: &str) -> &'static str {
    if prefix == DEFAULT_HIGHLIGHT_PREFIX {
        return DEFAULT_HIGHLIGHT_PREFIX;
    }
    if let Some(interned) = rw_read(&CLASS_PREFIXES, "markdown.prefixes").get(prefix).copied() {
        return interned;
    }

    let mut prefixes = rw_write(&CLASS_PREFIXES, "markdown.prefixes");
    if let Some(interned) = prefixes.get(prefix).copied() {
        return interned;
    }
    let interned: &'static str = Box::leak(prefix.to_owned().into_boxed_str());
    prefixes.insert(interned);
    interned
}

/// Decodes HTML entities comrak emits in code block content.
fn html_decode(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escapes HTML special characters.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
