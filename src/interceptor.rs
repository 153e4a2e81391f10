//! Query-interface facade that renders comments before the host parses them.
//!
//! The host reaches comment content through several independent paths: by
//! tree path, by element, by bare file, and by a file relative to an
//! element's package. Each one is intercepted here so the host's doc-tree
//! parser always sees hypertext. The two comment access patterns cache
//! differently on purpose:
//!
//! - [`doc_comment`](DocTreeProvider::doc_comment) renders the requested
//!   comment on every call and touches no table. Comments whose unit was
//!   already converted come back as they are.
//! - [`doc_comment_tree`](DocTreeProvider::doc_comment_tree) converts the
//!   whole unit's table on first access, so every later tree request in that
//!   unit parses already rendered text without rendering again.

use std::sync::Arc;

use tracing::trace;

use crate::comment::RenderedComment;
use crate::converter::CommentTableConverter;
use crate::error::{Error, Result};
use crate::file_view::FileContentView;
use crate::host::{
    CompilationUnit, DiagnosticKind, DocTreeProvider, FileObject, NodeId, SourceAccess, TreePath,
};
use crate::renderer::Renderer;

/// Drop-in substitute for the host's [`DocTreeProvider`].
pub struct CommentInterceptor<T, R>
where
    T: DocTreeProvider,
    R: ?Sized,
{
    trees: Arc<T>,
    renderer: Arc<R>,
    sources: Arc<dyn SourceAccess<T::Element>>,
    converter: CommentTableConverter,
}

impl<T, R> CommentInterceptor<T, R>
where
    T: DocTreeProvider,
    R: Renderer + ?Sized,
{
    pub fn new(
        trees: Arc<T>,
        renderer: Arc<R>,
        sources: Arc<dyn SourceAccess<T::Element>>,
    ) -> Self {
        Self {
            trees,
            renderer,
            sources,
            converter: CommentTableConverter::new(),
        }
    }

    /// The wrapped host provider.
    pub fn delegate(&self) -> &Arc<T> {
        &self.trees
    }

    /// Whether the comment table of `unit` has been rendered through this facade.
    pub fn is_unit_converted(&self, unit: &CompilationUnit) -> bool {
        self.converter.is_converted(unit)
    }
}

impl<T, R> DocTreeProvider for CommentInterceptor<T, R>
where
    T: DocTreeProvider,
    R: Renderer + ?Sized,
{
    type Element = T::Element;
    type Tree = T::Tree;
    type DocTree = T::DocTree;
    type DocCommentTree = T::DocCommentTree;
    type DocTreePath = T::DocTreePath;
    type Scope = T::Scope;
    type TypeMirror = T::TypeMirror;
    type AnnotationMirror = T::AnnotationMirror;
    type AnnotationValue = T::AnnotationValue;
    type CatchTree = T::CatchTree;

    fn break_locale(&self) -> Option<String> {
        self.trees.break_locale()
    }

    fn set_break_locale(&self, locale: Option<String>) {
        self.trees.set_break_locale(locale)
    }

    fn doc_comment(&self, path: &TreePath) -> Result<Option<String>> {
        let Some(raw) = self.trees.doc_comment(path)? else {
            return Ok(None);
        };
        // Already converted with its unit; rendering again would double-escape.
        if path.comment().is_some_and(|comment| comment.is_rendered()) {
            return Ok(Some(raw));
        }
        trace!(unit = path.unit().name(), node = path.node().0, "Rendering comment text");
        Ok(Some(self.renderer.render(&raw, false)?))
    }

    fn doc_comment_tree(&self, path: &TreePath) -> Result<Option<Self::DocCommentTree>> {
        let renderer = &*self.renderer;
        self.converter.convert(path.unit(), |comment| {
            RenderedComment::render(comment, renderer).map_err(Error::from)
        })?;
        self.trees.doc_comment_tree(path)
    }

    fn doc_comment_tree_for_element(
        &self,
        element: &Self::Element,
    ) -> Result<Option<Self::DocCommentTree>> {
        match self.trees.path(element) {
            Some(path) => self.doc_comment_tree(&path),
            None => Ok(None),
        }
    }

    fn doc_comment_tree_for_file(
        &self,
        file: &dyn FileObject,
    ) -> Result<Option<Self::DocCommentTree>> {
        // Empty names mark built-in headers and footers; they carry no markup.
        if file.name().is_empty() {
            return self.trees.doc_comment_tree_for_file(file);
        }
        let view = FileContentView::new(file, &*self.renderer);
        self.trees.doc_comment_tree_for_file(&view)
    }

    fn doc_comment_tree_relative(
        &self,
        element: &Self::Element,
        relative_path: &str,
    ) -> Result<Option<Self::DocCommentTree>> {
        let package = self.sources.package_of(element);
        let file = self
            .sources
            .source_file(&package, relative_path)?
            .ok_or_else(|| Error::NotFound(relative_path.to_string()))?;
        self.doc_comment_tree_for_file(file.as_ref())
    }

    fn doc_tree_path(
        &self,
        file: &dyn FileObject,
        package: &Self::Element,
    ) -> Option<Self::DocTreePath> {
        self.trees.doc_tree_path(file, package)
    }

    fn element_for_doc_path(&self, path: &Self::DocTreePath) -> Option<Self::Element> {
        self.trees.element_for_doc_path(path)
    }

    fn first_sentence(&self, trees: &[Self::DocTree]) -> Vec<Self::DocTree> {
        self.trees.first_sentence(trees)
    }

    fn start_position(
        &self,
        unit: &CompilationUnit,
        comment: &Self::DocCommentTree,
        tree: &Self::DocTree,
    ) -> Option<usize> {
        self.trees.start_position(unit, comment, tree)
    }

    fn end_position(
        &self,
        unit: &CompilationUnit,
        comment: &Self::DocCommentTree,
        tree: &Self::DocTree,
    ) -> Option<usize> {
        self.trees.end_position(unit, comment, tree)
    }

    fn tree(&self, element: &Self::Element) -> Option<Self::Tree> {
        self.trees.tree(element)
    }

    fn tree_for_annotation(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
    ) -> Option<Self::Tree> {
        self.trees.tree_for_annotation(element, annotation)
    }

    fn tree_for_annotation_value(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
        value: &Self::AnnotationValue,
    ) -> Option<Self::Tree> {
        self.trees.tree_for_annotation_value(element, annotation, value)
    }

    fn path(&self, element: &Self::Element) -> Option<TreePath> {
        self.trees.path(element)
    }

    fn path_for_annotation(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
    ) -> Option<TreePath> {
        self.trees.path_for_annotation(element, annotation)
    }

    fn path_for_annotation_value(
        &self,
        element: &Self::Element,
        annotation: &Self::AnnotationMirror,
        value: &Self::AnnotationValue,
    ) -> Option<TreePath> {
        self.trees.path_for_annotation_value(element, annotation, value)
    }

    fn path_of_node(&self, unit: &Arc<CompilationUnit>, node: NodeId) -> Option<TreePath> {
        self.trees.path_of_node(unit, node)
    }

    fn element(&self, path: &TreePath) -> Option<Self::Element> {
        self.trees.element(path)
    }

    fn type_mirror(&self, path: &TreePath) -> Option<Self::TypeMirror> {
        self.trees.type_mirror(path)
    }

    fn original_type(&self, error_type: &Self::TypeMirror) -> Option<Self::TypeMirror> {
        self.trees.original_type(error_type)
    }

    fn scope(&self, path: &TreePath) -> Option<Self::Scope> {
        self.trees.scope(path)
    }

    fn is_accessible(&self, scope: &Self::Scope, element: &Self::Element) -> bool {
        self.trees.is_accessible(scope, element)
    }

    fn is_member_accessible(
        &self,
        scope: &Self::Scope,
        member: &Self::Element,
        declared_type: &Self::TypeMirror,
    ) -> bool {
        self.trees.is_member_accessible(scope, member, declared_type)
    }

    fn lub(&self, catch_tree: &Self::CatchTree) -> Option<Self::TypeMirror> {
        self.trees.lub(catch_tree)
    }

    fn print_message(&self, kind: DiagnosticKind, message: &str, path: Option<&TreePath>) {
        self.trees.print_message(kind, message, path)
    }

    fn print_tree_message(
        &self,
        kind: DiagnosticKind,
        message: &str,
        tree: &Self::Tree,
        unit: &CompilationUnit,
    ) {
        self.trees.print_tree_message(kind, message, tree, unit)
    }

    fn print_doc_message(
        &self,
        kind: DiagnosticKind,
        message: &str,
        tree: &Self::DocTree,
        comment: &Self::DocCommentTree,
        unit: &CompilationUnit,
    ) {
        self.trees.print_doc_message(kind, message, tree, comment, unit)
    }
}
