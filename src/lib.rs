//! Render lightweight markup in documentation comments before the host's
//! doc-tree parser sees them.

mod comment;
mod config;
mod converter;
mod environment;
mod error;
mod file_view;
pub mod host;
mod interceptor;
mod lock;
pub mod markup;
mod path;
mod renderer;
mod source;

pub use comment::RenderedComment;
pub use config::{DEFAULT_HIGHLIGHT_PREFIX, RenderOptions};
pub use converter::CommentTableConverter;
pub use environment::FilteredEnvironment;
pub use error::{Error, RenderError, Result};
pub use file_view::FileContentView;
pub use host::{
    Comment, CommentRecord, CommentStyle, CommentTable, CompilationUnit, DiagnosticKind,
    DocEnvironment, DocTreeProvider, FileObject, NodeId, SourceAccess, TreePath, UnitId,
};
pub use interceptor::CommentInterceptor;
pub use markup::MarkdownRenderer;
pub use path::{is_relative_name, package_dir};
pub use renderer::Renderer;
pub use source::{LocalFile, SourceLookup, SourcePath};
