//! Filesystem-backed documentation files and source-path lookup.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::host::{FileObject, SourceAccess};
use crate::path::{is_relative_name, package_dir};

/// Documentation file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileObject for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn uri(&self) -> String {
        let absolute = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        format!("file://{}", absolute.display())
    }

    fn char_content(&self, ignore_encoding_errors: bool) -> io::Result<String> {
        if !ignore_encoding_errors {
            return fs::read_to_string(&self.path);
        }
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn open_input_stream(&self) -> io::Result<Box<dyn io::Read + Send + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn open_output_stream(&self) -> io::Result<Box<dyn Write + Send + '_>> {
        Ok(Box::new(File::create(&self.path)?))
    }

    fn open_writer(&self) -> io::Result<Box<dyn Write + Send + '_>> {
        Ok(Box::new(BufWriter::new(File::create(&self.path)?)))
    }

    fn last_modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|meta| meta.modified()).ok()
    }

    fn delete(&self) -> bool {
        fs::remove_file(&self.path).is_ok()
    }
}

/// Ordered list of source roots searched for package documentation files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePath {
    roots: Vec<PathBuf>,
}

impl SourcePath {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Finds `relative_name` in the directory of `package` under the first
    /// root that has it.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] if `relative_name` is absolute
    /// or walks out of the package directory with `.` or `..`.
    pub fn find(&self, package: &str, relative_name: &str) -> io::Result<Option<LocalFile>> {
        if !is_relative_name(relative_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid relative name: {}", relative_name),
            ));
        }

        let dir = package_dir(package);
        Ok(self
            .roots
            .iter()
            .map(|root| root.join(&dir).join(relative_name))
            .find(|candidate| candidate.is_file())
            .map(LocalFile::new))
    }
}

/// [`SourceAccess`] over a [`SourcePath`], with the host supplying package
/// names for its elements.
pub struct SourceLookup<F> {
    source_path: SourcePath,
    package_of: F,
}

impl<F> SourceLookup<F> {
    pub fn new(source_path: SourcePath, package_of: F) -> Self {
        Self {
            source_path,
            package_of,
        }
    }

    pub fn source_path(&self) -> &SourcePath {
        &self.source_path
    }
}

impl<E, F> SourceAccess<E> for SourceLookup<F>
where
    E: ?Sized,
    F: Fn(&E) -> String + Send + Sync,
{
    fn package_of(&self, element: &E) -> String {
        (self.package_of)(element)
    }

    fn source_file(
        &self,
        package: &str,
        relative_name: &str,
    ) -> io::Result<Option<Arc<dyn FileObject>>> {
        let file = self.source_path.find(package, relative_name)?;
        Ok(file.map(|file| Arc::new(file) as Arc<dyn FileObject>))
    }
}
