//! Splitting doc comment text into main description and block tags.

use crate::error::RenderError;

/// Block tag such as `@param name description`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTag {
    pub name: String,
    pub content: String,
}

/// Doc comment text split at its first block tag.
///
/// Indentation common to all non-blank lines is removed first, so markup
/// that would otherwise read as an indented code block renders as written.
/// Lines inside fenced code never start a block tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocComment {
    pub body: String,
    pub tags: Vec<BlockTag>,
}

impl DocComment {
    /// Parses `text`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Markup`] when a code fence is never closed,
    /// since every block tag after it would be swallowed.
    pub fn parse(text: &str) -> Result<Self, RenderError> {
        let lines = dedent(text);
        let mut comment = DocComment::default();
        let mut fence: Option<Fence> = None;

        for (number, line) in lines.iter().enumerate() {
            match fence {
                Some(open) => {
                    if open.closed_by(line) {
                        fence = None;
                    }
                }
                None => {
                    if let Some(open) = Fence::open(line, number + 1) {
                        fence = Some(open);
                    } else if let Some(tag) = block_tag(line) {
                        comment.tags.push(tag);
                        continue;
                    }
                }
            }

            match comment.tags.last_mut() {
                Some(tag) => {
                    tag.content.push('\n');
                    tag.content.push_str(line);
                }
                None => {
                    if !comment.body.is_empty() || !line.trim().is_empty() {
                        comment.body.push_str(line);
                        comment.body.push('\n');
                    }
                }
            }
        }

        if let Some(open) = fence {
            return Err(RenderError::Markup(format!(
                "unterminated code fence opened on line {}",
                open.line
            )));
        }

        let trimmed = comment.body.trim_end().len();
        comment.body.truncate(trimmed);
        for tag in &mut comment.tags {
            let trimmed = tag.content.trim_end().len();
            tag.content.truncate(trimmed);
        }

        Ok(comment)
    }
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    width: usize,
    line: usize,
}

impl Fence {
    fn open(line: &str, number: usize) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let width = trimmed.chars().take_while(|c| *c == marker).count();
        (width >= 3).then_some(Self {
            marker,
            width,
            line: number,
        })
    }

    fn closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let width = trimmed.chars().take_while(|c| *c == self.marker).count();
        width >= self.width && width == trimmed.chars().count()
    }
}

fn block_tag(line: &str) -> Option<BlockTag> {
    let rest = line.trim_start().strip_prefix('@')?;
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(BlockTag {
        name: rest[..end].to_string(),
        content: rest[end..].trim_start().to_string(),
    })
}

/// Strips the indentation shared by every non-blank line.
fn dedent(text: &str) -> Vec<&str> {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect()
}
