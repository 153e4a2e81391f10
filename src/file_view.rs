//! Rendering view over a documentation file.

use std::io::{self, BufRead, Cursor, Read, Write};
use std::time::SystemTime;

use tracing::debug;

use crate::host::FileObject;
use crate::renderer::Renderer;

/// Presents a [`FileObject`] whose content reads come back rendered.
///
/// Each read renders the wrapped file's current content again; nothing is
/// cached. Writes and metadata go straight to the wrapped file. Render
/// failures surface as [`io::ErrorKind::InvalidData`] errors wrapping the
/// [`RenderError`](crate::RenderError).
pub struct FileContentView<'a, R: ?Sized> {
    file: &'a dyn FileObject,
    renderer: &'a R,
}

impl<'a, R> FileContentView<'a, R>
where
    R: Renderer + ?Sized,
{
    pub fn new(file: &'a dyn FileObject, renderer: &'a R) -> Self {
        Self { file, renderer }
    }

    /// The file being viewed.
    pub fn inner(&self) -> &'a dyn FileObject {
        self.file
    }
}

impl<R> FileObject for FileContentView<'_, R>
where
    R: Renderer + ?Sized,
{
    fn name(&self) -> &str {
        self.file.name()
    }

    fn uri(&self) -> String {
        self.file.uri()
    }

    fn char_content(&self, ignore_encoding_errors: bool) -> io::Result<String> {
        let raw = self.file.char_content(ignore_encoding_errors)?;
        debug!(file = self.file.name(), bytes = raw.len(), "Rendering file content");
        self.renderer
            .render(&raw, false)
            .map_err(|err| err.into_io())
    }

    fn open_input_stream(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.char_content(true)?.into_bytes())))
    }

    fn open_reader(
        &self,
        ignore_encoding_errors: bool,
    ) -> io::Result<Box<dyn BufRead + Send + '_>> {
        Ok(Box::new(Cursor::new(self.char_content(ignore_encoding_errors)?)))
    }

    fn open_output_stream(&self) -> io::Result<Box<dyn Write + Send + '_>> {
        self.file.open_output_stream()
    }

    fn open_writer(&self) -> io::Result<Box<dyn Write + Send + '_>> {
        self.file.open_writer()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.file.last_modified()
    }

    fn delete(&self) -> bool {
        self.file.delete()
    }
}
