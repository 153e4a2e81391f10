//! Host environment wrapper that installs the comment interceptor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::Result;
use crate::host::{DocEnvironment, DocTreeProvider, SourceAccess};
use crate::interceptor::CommentInterceptor;
use crate::renderer::Renderer;

type ElementOf<E> = <<E as DocEnvironment>::Trees as DocTreeProvider>::Element;

/// Presents the host environment unchanged except for its tree provider,
/// which is replaced by a [`CommentInterceptor`].
///
/// The environment owns the renderer's lifecycle. [`close`](Self::close)
/// releases it; dropping the environment closes it if that has not
/// happened yet. Cleanup runs exactly once either way.
pub struct FilteredEnvironment<E, R>
where
    E: DocEnvironment,
    R: Renderer + ?Sized,
{
    delegate: E,
    renderer: Arc<R>,
    trees: Arc<CommentInterceptor<E::Trees, R>>,
    closed: AtomicBool,
}

impl<E, R> FilteredEnvironment<E, R>
where
    E: DocEnvironment,
    R: Renderer + ?Sized,
{
    /// Wraps `environment`, rendering its comments with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostAccess`](crate::Error::HostAccess) when the host
    /// cannot provide source access. There is no degraded mode: without it,
    /// relative documentation files could not be resolved.
    pub fn new(environment: E, renderer: Arc<R>) -> Result<Self> {
        let sources = environment.source_access()?;
        let trees = Arc::new(CommentInterceptor::new(
            environment.doc_trees(),
            Arc::clone(&renderer),
            sources,
        ));
        Ok(Self {
            delegate: environment,
            renderer,
            trees,
            closed: AtomicBool::new(false),
        })
    }

    /// The wrapped host environment.
    pub fn delegate(&self) -> &E {
        &self.delegate
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases the renderer. Later calls do nothing.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.renderer.cleanup();
        info!("Released markup renderer");
    }
}

impl<E, R> DocEnvironment for FilteredEnvironment<E, R>
where
    E: DocEnvironment,
    R: Renderer + ?Sized,
{
    type Trees = CommentInterceptor<E::Trees, R>;

    fn included_elements(&self) -> Vec<ElementOf<E>> {
        self.delegate.included_elements()
    }

    fn is_included(&self, element: &ElementOf<E>) -> bool {
        self.delegate.is_included(element)
    }

    fn is_selected(&self, element: &ElementOf<E>) -> bool {
        self.delegate.is_selected(element)
    }

    fn doc_trees(&self) -> Arc<Self::Trees> {
        Arc::clone(&self.trees)
    }

    fn source_access(&self) -> Result<Arc<dyn SourceAccess<ElementOf<E>>>> {
        self.delegate.source_access()
    }
}

impl<E, R> Drop for FilteredEnvironment<E, R>
where
    E: DocEnvironment,
    R: Renderer + ?Sized,
{
    fn drop(&mut self) {
        self.close();
    }
}
