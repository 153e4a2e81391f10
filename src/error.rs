//! Error types for comment interception and markup rendering.

use std::io;

use thiserror::Error;

/// Failure reported by a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Input markup could not be translated.
    #[error("malformed markup: {0}")]
    Markup(String),

    /// Fenced code could not be highlighted.
    #[error("failed to highlight `{language}` code block: {reason}")]
    Highlight { language: String, reason: String },

    /// Renderer was used after its resources were released.
    #[error("renderer has been cleaned up")]
    Closed,
}

impl RenderError {
    /// Wraps the render failure for transport through `std::io` read paths.
    pub fn into_io(self) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, self)
    }
}

/// Errors surfaced by the interception layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A comment or documentation file failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A relative documentation file did not resolve on the source path.
    #[error("{0}")]
    NotFound(String),

    /// Source access could not be obtained from the host at setup.
    #[error("cannot access host source state: {0}")]
    HostAccess(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Error raised by the host itself, carried unmodified.
    #[error(transparent)]
    Host(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a host error without altering it.
    pub fn host<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Host(Box::new(error))
    }

    /// Returns the render failure behind this error, looking through I/O wrapping.
    ///
    /// File content reads report render failures as `io::Error`, since the
    /// [`FileObject`](crate::FileObject) read methods are I/O shaped.
    pub fn render_error(&self) -> Option<&RenderError> {
        match self {
            Self::Render(err) => Some(err),
            Self::Io(err) => err.get_ref().and_then(|inner| inner.downcast_ref::<RenderError>()),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
