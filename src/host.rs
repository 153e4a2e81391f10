//! Interfaces and data model of the host documentation tool.
//!
//! The host owns compilation units, their comment tables, and the doc-tree
//! parser. This module describes the surface the interception layer needs
//! from it: the [`DocTreeProvider`] query interface, the [`DocEnvironment`]
//! that hands it out, [`FileObject`] content resources, and the
//! [`SourceAccess`] adapter for source-path lookups.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, BufRead, Cursor, Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::error::Result;
use crate::lock::{rw_read, rw_write};

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a compilation unit, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

/// Syntax tree node carrying a comment, as numbered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Lexical form of a comment in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    Line,
    Block,
    Doc,
}

/// A comment as stored in a unit's comment table.
pub trait Comment: fmt::Debug + Send + Sync {
    /// Comment body with delimiters stripped.
    fn text(&self) -> &str;

    fn style(&self) -> CommentStyle;

    fn is_deprecated(&self) -> bool;

    /// Maps a byte offset in [`text`](Comment::text) to a source offset.
    ///
    /// Returns `None` when the offset cannot be mapped.
    fn source_pos(&self, index: usize) -> Option<usize>;

    /// True once the text has been rendered to hypertext.
    fn is_rendered(&self) -> bool {
        false
    }
}

/// Raw comment read from source by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    text: String,
    style: CommentStyle,
    deprecated: bool,
    positions: Vec<usize>,
}

impl CommentRecord {
    /// Creates a record whose text starts at source offset `start` and maps
    /// byte for byte onto the source.
    pub fn new(text: impl Into<String>, style: CommentStyle, start: usize) -> Self {
        let text = text.into();
        let positions = (start..start + text.len()).collect();
        Self {
            text,
            style,
            deprecated: false,
            positions,
        }
    }

    /// Creates a record with an explicit position table, one entry per byte of text.
    ///
    /// Hosts use this when comment decoration (leading `*`, indentation) was
    /// stripped and offsets no longer run contiguously.
    pub fn with_positions(
        text: impl Into<String>,
        style: CommentStyle,
        positions: Vec<usize>,
    ) -> Self {
        Self {
            text: text.into(),
            style,
            deprecated: false,
            positions,
        }
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

impl Comment for CommentRecord {
    fn text(&self) -> &str {
        &self.text
    }

    fn style(&self) -> CommentStyle {
        self.style
    }

    fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    fn source_pos(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }
}

/// Per-unit mapping from syntax node to comment.
#[derive(Debug, Clone, Default)]
pub struct CommentTable {
    entries: BTreeMap<NodeId, Arc<dyn Comment>>,
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, comment: impl Comment + 'static) {
        self.entries.insert(node, Arc::new(comment));
    }

    /// Inserts an already shared comment without copying it.
    pub fn insert_shared(&mut self, node: NodeId, comment: Arc<dyn Comment>) {
        self.entries.insert(node, comment);
    }

    pub fn get(&self, node: NodeId) -> Option<&Arc<dyn Comment>> {
        self.entries.get(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Arc<dyn Comment>)> {
        self.entries.iter().map(|(node, comment)| (*node, comment))
    }
}

/// Parsed representation of one source file.
///
/// The comment table is immutable once built. Conversion installs a new
/// table wholesale through [`replace_comments`](Self::replace_comments);
/// readers holding the previous table keep a consistent snapshot.
#[derive(Debug)]
pub struct CompilationUnit {
    id: UnitId,
    name: String,
    comments: RwLock<Arc<CommentTable>>,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>, comments: CommentTable) -> Self {
        Self {
            id: UnitId(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            comments: RwLock::new(Arc::new(comments)),
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Source file name of the unit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current comment table snapshot.
    pub fn comments(&self) -> Arc<CommentTable> {
        Arc::clone(&rw_read(&self.comments, "unit.comments"))
    }

    pub fn comment(&self, node: NodeId) -> Option<Arc<dyn Comment>> {
        rw_read(&self.comments, "unit.comment").get(node).cloned()
    }

    /// Installs `table` in place of the current comment table.
    pub fn replace_comments(&self, table: CommentTable) {
        *rw_write(&self.comments, "unit.replace_comments") = Arc::new(table);
    }
}

/// Location of a syntax node within its compilation unit.
#[derive(Debug, Clone)]
pub struct TreePath {
    unit: Arc<CompilationUnit>,
    node: NodeId,
}

impl TreePath {
    pub fn new(unit: Arc<CompilationUnit>, node: NodeId) -> Self {
        Self { unit, node }
    }

    pub fn unit(&self) -> &Arc<CompilationUnit> {
        &self.unit
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Comment attached to this node in the unit's current table.
    pub fn comment(&self) -> Option<Arc<dyn Comment>> {
        self.unit.comment(self.node)
    }
}

/// Severity of a diagnostic sent to the host's reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    MandatoryWarning,
    Note,
    Other,
}

/// Named content resource such as an overview or package documentation file.
pub trait FileObject: Send + Sync {
    /// Resource name. Built-in boilerplate resources use the empty name.
    fn name(&self) -> &str;

    fn uri(&self) -> String;

    fn char_content(&self, ignore_encoding_errors: bool) -> io::Result<String>;

    fn open_input_stream(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.char_content(true)?.into_bytes())))
    }

    fn open_reader(
        &self,
        ignore_encoding_errors: bool,
    ) -> io::Result<Box<dyn BufRead + Send + '_>> {
        Ok(Box::new(Cursor::new(self.char_content(ignore_encoding_errors)?)))
    }

    fn open_output_stream(&self) -> io::Result<Box<dyn Write + Send + '_>>;

    fn open_writer(&self) -> io::Result<Box<dyn Write + Send + '_>>;

    fn last_modified(&self) -> Option<SystemTime>;

    /// Deletes the resource, returning whether it was removed.
    fn delete(&self) -> bool;
}

/// Host state needed to resolve documentation files relative to an element.
///
/// Hosts hand this out from [`DocEnvironment::source_access`]; it is the only
/// channel through which the interception layer reaches host internals.
pub trait SourceAccess<E: ?Sized>: Send + Sync {
    /// Qualified name of the package owning `element`, empty for the unnamed package.
    fn package_of(&self, element: &E) -> String;

    /// Looks up `relative_name` under `package` on the source path.
    fn source_file(
        &self,
        package: &str,
        relative_name: &str,
    ) -> io::Result<Option<Arc<dyn FileObject>>>;
}

/// Comment and tree query interface of the host.
///
/// Host specific tree structures are left opaque through associated types;
/// the interception layer only forwards them.
pub trait DocTreeProvider: Send + Sync {
    type Element: 'static;
    type Tree;
    type DocTree;
    type DocCommentTree;
    type DocTreePath;
    type Scope;
    type TypeMirror;
    type AnnotationMirror;
    type AnnotationValue;
    type CatchTree;

    /// Locale used to find sentence breaks, `None` for the host default.
    fn break_locale(&self) -> Option<String>;

    fn set_break_locale(&self, locale: Option<String>);

    /// Comment text attached to `path`.
    fn doc_comment(&self, path: &TreePath) -> Result<Option<String>>;

    /// Parses the comment attached to `path` from its unit's comment table.
    fn doc_comment_tree(&self, path: &TreePath) -> Result<Option<Self::DocCommentTree>>;

    fn doc_comment_tree_for_element(
        &self,
        element: &Self::Element,
    ) -> Result<Option<Self::DocCommentTree>>;

    /// Parses a whole documentation file.
    fn doc_comment_tree_for_file(
        &self,
        file: &dyn FileObject,
    ) -> Result<Option<Self::DocCommentTree>>;

    /// Parses the documentation file at `relative_path` in the package of `element`.
    fn doc_comment_tree_relative(
        &self,
        element: &Self::Element,
        relative_path: &str,
    ) -> Result<Option<Self::DocCommentTree>>;

    fn doc_tree_path(
        &self,
        file: &dyn FileObject,
        package: &Self::Element,
    ) -> Option<Self::DocTreePath>;

    fn element_for_doc_path(&self, path: &Self::DocTreePath) -> Option<Self::Element>;

    fn first_sentence(&self, trees: &[Self::DocTree]) -> Vec<Self::DocTree>;

    /// Source offset where `tree` starts within `comment`.
    fn start_position(
        &self,
        unit: &CompilationUnit,
        comment: &Self::DocCommentTree,
        tree: &Self::DocTree,
    ) -> Option<usize>;

    fn end_position(
        &self,
        unit: &CompilationUnit,
        comment: &Self::DocCommentTree,
        tree: &Self::DocTree,
    ) -> Option<usize>;

    fn tree(&self, element: &Self::Element) -> Option<Self::Tree>;

    /// Tree of `annotation` as declared on `element`.
    fn tree_for_annotation(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
    ) -> Option<Self::Tree>;

    /// Tree of `value` within `annotation` on `element`.
    fn tree_for_annotation_value(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
        value: &Self::AnnotationValue,
    ) -> Option<Self::Tree>;

    fn path(&self, element: &Self::Element) -> Option<TreePath>;

    fn path_for_annotation(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
    ) -> Option<TreePath>;

    fn path_for_annotation_value(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
        value: &Self::AnnotationValue,
    ) -> Option<TreePath>;

    fn path_of_node(&self, unit: &Arc<CompilationUnit>, node: NodeId) -> Option<TreePath>;

    fn element(&self, path: &TreePath) -> Option<Self::Element>;

    fn type_mirror(&self, path: &TreePath) -> Option<Self::TypeMirror>;

    fn original_type(&self, error_type: &Self::TypeMirror) -> Option<Self::TypeMirror>;

    fn scope(&self, path: &TreePath) -> Option<Self::Scope>;

    fn is_accessible(&self, scope: &Self::Scope, element: &Self::Element) -> bool;

    /// Whether `member` is accessible from `scope` when seen as a member of `declared_type`.
    fn is_member_accessible(
        &self,
        scope: &Self::Scope,
        member: &Self::Element,
        declared_type: &Self::TypeMirror,
    ) -> bool;

    /// Least upper bound of the exception types caught by `catch_tree`.
    fn lub(&self, catch_tree: &Self::CatchTree) -> Option<Self::TypeMirror>;

    fn print_message(&self, kind: DiagnosticKind, message: &str, path: Option<&TreePath>);

    /// Reports a diagnostic located at `tree` within `unit`.
    fn print_tree_message(
        &self,
        kind: DiagnosticKind,
        message: &str,
        tree: &Self::Tree,
        unit: &CompilationUnit,
    );

    fn print_doc_message(
        &self,
        kind: DiagnosticKind,
        message: &str,
        tree: &Self::DocTree,
        comment: &Self::DocCommentTree,
        unit: &CompilationUnit,
    );
}

/// Documentation run environment handed to the doc generator.
pub trait DocEnvironment {
    type Trees: DocTreeProvider;

    /// Elements selected for documentation.
    fn included_elements(&self) -> Vec<<Self::Trees as DocTreeProvider>::Element>;

    fn is_included(&self, element: &<Self::Trees as DocTreeProvider>::Element) -> bool;

    fn is_selected(&self, element: &<Self::Trees as DocTreeProvider>::Element) -> bool;

    fn doc_trees(&self) -> Arc<Self::Trees>;

    /// Source access for relative documentation files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostAccess`](crate::Error::HostAccess) when the host
    /// cannot expose its element or file lookup state.
    fn source_access(
        &self,
    ) -> Result<Arc<dyn SourceAccess<<Self::Trees as DocTreeProvider>::Element>>>;
}
