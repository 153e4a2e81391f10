//! Shared test utilities for integration tests.
//!
//! Provides an in-memory host: a doc-tree provider whose "parsed tree" is
//! simply the comment text it read, an environment handing it out, and a
//! renderer wrapper that counts calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use markdoclet::{
    CommentRecord, CommentStyle, CommentTable, CompilationUnit, DiagnosticKind, DocEnvironment,
    DocTreeProvider, Error, FileObject, MarkdownRenderer, NodeId, RenderError, Renderer, Result,
    SourceAccess, TreePath,
};

/// Builds a unit holding one doc comment per `(node, text)` pair.
pub fn unit(name: &str, comments: &[(u32, &str)]) -> Arc<CompilationUnit> {
    let mut table = CommentTable::new();
    for (offset, (node, text)) in comments.iter().enumerate() {
        table.insert(
            NodeId(*node),
            CommentRecord::new(*text, CommentStyle::Doc, offset * 100),
        );
    }
    Arc::new(CompilationUnit::new(name, table))
}

/// Renderer wrapper counting render and cleanup calls.
pub struct Counting<R> {
    inner: R,
    renders: AtomicUsize,
    cleanups: AtomicUsize,
}

impl<R> Counting<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            renders: AtomicUsize::new(0),
            cleanups: AtomicUsize::new(0),
        }
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

impl Counting<MarkdownRenderer> {
    pub fn markdown() -> Self {
        Self::new(MarkdownRenderer::new())
    }
}

impl<R: Renderer> Renderer for Counting<R> {
    fn render(&self, text: &str, inline: bool) -> std::result::Result<String, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.inner.render(text, inline)
    }

    fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        self.inner.cleanup();
    }
}

/// In-memory documentation file.
pub struct MemoryFile {
    name: String,
    content: String,
    reads: AtomicUsize,
}

impl MemoryFile {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FileObject for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn uri(&self) -> String {
        format!("memory:///{}", self.name)
    }

    fn char_content(&self, _ignore_encoding_errors: bool) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.content.clone())
    }

    fn open_output_stream(&self) -> io::Result<Box<dyn Write + Send + '_>> {
        Ok(Box::new(io::sink()))
    }

    fn open_writer(&self) -> io::Result<Box<dyn Write + Send + '_>> {
        Ok(Box::new(io::sink()))
    }

    fn last_modified(&self) -> Option<SystemTime> {
        None
    }

    fn delete(&self) -> bool {
        false
    }
}

/// Doc-tree provider over a fixed set of elements.
///
/// Elements are qualified names such as `org.demo.Widget`. A parsed doc
/// comment tree is the comment text as the provider saw it, which lets
/// tests observe whether the text was rendered first.
#[derive(Default)]
pub struct FakeTrees {
    elements: HashMap<String, TreePath>,
    locale: Mutex<Option<String>>,
    messages: Mutex<Vec<(DiagnosticKind, String)>>,
    tree_requests: AtomicUsize,
}

impl FakeTrees {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `element` as declared at `node` of `unit`.
    pub fn with_element(mut self, element: &str, unit: &Arc<CompilationUnit>, node: u32) -> Self {
        self.elements.insert(
            element.to_string(),
            TreePath::new(Arc::clone(unit), NodeId(node)),
        );
        self
    }

    pub fn tree_requests(&self) -> usize {
        self.tree_requests.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<(DiagnosticKind, String)> {
        self.messages.lock().expect("Messages lock poisoned").clone()
    }
}

impl DocTreeProvider for FakeTrees {
    type Element = String;
    type Tree = String;
    type DocTree = String;
    type DocCommentTree = String;
    type DocTreePath = (String, String);
    type Scope = String;
    type TypeMirror = String;
    type AnnotationMirror = String;
    type AnnotationValue = String;
    type CatchTree = Vec<String>;

    fn break_locale(&self) -> Option<String> {
        self.locale.lock().expect("Locale lock poisoned").clone()
    }

    fn set_break_locale(&self, locale: Option<String>) {
        *self.locale.lock().expect("Locale lock poisoned") = locale;
    }

    fn doc_comment(&self, path: &TreePath) -> Result<Option<String>> {
        Ok(path.comment().map(|comment| comment.text().to_string()))
    }

    fn doc_comment_tree(&self, path: &TreePath) -> Result<Option<String>> {
        self.tree_requests.fetch_add(1, Ordering::SeqCst);
        Ok(path.comment().map(|comment| comment.text().to_string()))
    }

    fn doc_comment_tree_for_element(&self, element: &String) -> Result<Option<String>> {
        match self.elements.get(element) {
            Some(path) => self.doc_comment_tree(path),
            None => Ok(None),
        }
    }

    fn doc_comment_tree_for_file(&self, file: &dyn FileObject) -> Result<Option<String>> {
        Ok(Some(file.char_content(false)?))
    }

    fn doc_comment_tree_relative(
        &self,
        _element: &String,
        relative_path: &str,
    ) -> Result<Option<String>> {
        Err(Error::NotFound(relative_path.to_string()))
    }

    fn doc_tree_path(&self, file: &dyn FileObject, package: &String) -> Option<(String, String)> {
        Some((package.clone(), file.name().to_string()))
    }

    fn element_for_doc_path(&self, path: &(String, String)) -> Option<String> {
        Some(path.0.clone())
    }

    fn first_sentence(&self, trees: &[String]) -> Vec<String> {
        trees.iter().take(1).cloned().collect()
    }

    fn start_position(
        &self,
        _unit: &CompilationUnit,
        comment: &String,
        tree: &String,
    ) -> Option<usize> {
        comment.find(tree.as_str())
    }

    fn end_position(
        &self,
        _unit: &CompilationUnit,
        comment: &String,
        tree: &String,
    ) -> Option<usize> {
        comment.find(tree.as_str()).map(|start| start + tree.len())
    }

    fn tree(&self, element: &String) -> Option<String> {
        self.elements
            .contains_key(element)
            .then(|| format!("tree:{}", element))
    }

    fn tree_for_annotation(&self, element: &String, annotation: &String) -> Option<String> {
        self.elements
            .contains_key(element)
            .then(|| format!("tree:{}@{}", element, annotation))
    }

    fn tree_for_annotation_value(
        &self,
        element: &String,
        annotation: &String,
        value: &String,
    ) -> Option<String> {
        self.tree_for_annotation(element, annotation)
            .map(|tree| format!("{}={}", tree, value))
    }

    fn path(&self, element: &String) -> Option<TreePath> {
        self.elements.get(element).cloned()
    }

    fn path_for_annotation(&self, element: &String, _annotation: &String) -> Option<TreePath> {
        self.elements.get(element).cloned()
    }

    fn path_for_annotation_value(
        &self,
        element: &String,
        annotation: &String,
        value: &String,
    ) -> Option<TreePath> {
        (!value.is_empty())
            .then(|| self.path_for_annotation(element, annotation))
            .flatten()
    }

    fn path_of_node(&self, unit: &Arc<CompilationUnit>, node: NodeId) -> Option<TreePath> {
        unit.comment(node)
            .map(|_| TreePath::new(Arc::clone(unit), node))
    }

    fn element(&self, path: &TreePath) -> Option<String> {
        self.elements
            .iter()
            .find(|(_, candidate)| {
                candidate.unit().id() == path.unit().id() && candidate.node() == path.node()
            })
            .map(|(element, _)| element.clone())
    }

    fn type_mirror(&self, path: &TreePath) -> Option<String> {
        self.element(path).map(|element| format!("type:{}", element))
    }

    fn original_type(&self, error_type: &String) -> Option<String> {
        error_type.strip_prefix("type:").map(str::to_string)
    }

    fn scope(&self, path: &TreePath) -> Option<String> {
        Some(path.unit().name().to_string())
    }

    fn is_accessible(&self, scope: &String, element: &String) -> bool {
        self.elements
            .get(element)
            .is_some_and(|path| path.unit().name() == scope)
    }

    fn is_member_accessible(&self, scope: &String, member: &String, declared_type: &String) -> bool {
        self.is_accessible(scope, member) && declared_type.starts_with("type:")
    }

    fn lub(&self, catch_tree: &Vec<String>) -> Option<String> {
        match catch_tree.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            _ => Some("Throwable".to_string()),
        }
    }

    fn print_message(&self, kind: DiagnosticKind, message: &str, _path: Option<&TreePath>) {
        self.messages
            .lock()
            .expect("Messages lock poisoned")
            .push((kind, message.to_string()));
    }

    fn print_tree_message(
        &self,
        kind: DiagnosticKind,
        message: &str,
        tree: &String,
        unit: &CompilationUnit,
    ) {
        self.messages
            .lock()
            .expect("Messages lock poisoned")
            .push((kind, format!("{}: {}: {}", unit.name(), tree, message)));
    }

    fn print_doc_message(
        &self,
        kind: DiagnosticKind,
        message: &str,
        tree: &String,
        _comment: &String,
        unit: &CompilationUnit,
    ) {
        self.messages
            .lock()
            .expect("Messages lock poisoned")
            .push((kind, format!("{}: {}: {}", unit.name(), tree, message)));
    }
}

/// Environment handing out a [`FakeTrees`]; without source access it
/// reports a host access failure.
pub struct FakeEnvironment {
    trees: Arc<FakeTrees>,
    sources: Option<Arc<dyn SourceAccess<String>>>,
}

impl FakeEnvironment {
    pub fn new(trees: FakeTrees, sources: Arc<dyn SourceAccess<String>>) -> Self {
        Self {
            trees: Arc::new(trees),
            sources: Some(sources),
        }
    }

    pub fn without_source_access(trees: FakeTrees) -> Self {
        Self {
            trees: Arc::new(trees),
            sources: None,
        }
    }
}

impl DocEnvironment for FakeEnvironment {
    type Trees = FakeTrees;

    fn included_elements(&self) -> Vec<String> {
        let mut elements: Vec<String> = self.trees.elements.keys().cloned().collect();
        elements.sort();
        elements
    }

    fn is_included(&self, element: &String) -> bool {
        self.trees.elements.contains_key(element)
    }

    fn is_selected(&self, element: &String) -> bool {
        self.is_included(element) && !element.ends_with("Internal")
    }

    fn doc_trees(&self) -> Arc<FakeTrees> {
        Arc::clone(&self.trees)
    }

    fn source_access(&self) -> Result<Arc<dyn SourceAccess<String>>> {
        self.sources
            .clone()
            .ok_or_else(|| Error::HostAccess("file manager is not a standard file manager".into()))
    }
}

/// Source access resolving files from an in-memory map keyed by
/// `package/relative_name`.
#[derive(Default)]
pub struct MemorySources {
    files: HashMap<String, Arc<MemoryFile>>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, package: &str, relative_name: &str, content: &str) -> Self {
        let key = format!("{}/{}", package, relative_name);
        self.files
            .insert(key, Arc::new(MemoryFile::new(relative_name, content)));
        self
    }
}

/// Package of a qualified element name: everything before the last `.`.
pub fn package_of(element: &str) -> String {
    element
        .rsplit_once('.')
        .map(|(package, _)| package.to_string())
        .unwrap_or_default()
}

impl SourceAccess<String> for MemorySources {
    fn package_of(&self, element: &String) -> String {
        package_of(element)
    }

    fn source_file(
        &self,
        package: &str,
        relative_name: &str,
    ) -> io::Result<Option<Arc<dyn FileObject>>> {
        let key = format!("{}/{}", package, relative_name);
        Ok(self
            .files
            .get(&key)
            .map(|file| Arc::clone(file) as Arc<dyn FileObject>))
    }
}
