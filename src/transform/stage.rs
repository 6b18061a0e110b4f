//! Pipeline stages and their composition.
//!
//! A stage is a bundle of `lol_html` content handlers. Plugins are factories
//! that build a fresh stage for every document, so handlers may borrow the
//! [`Page`] being processed.

use std::borrow::Cow;
use std::sync::Arc;

use lol_html::{DocumentContentHandlers, ElementContentHandlers, RewriteStrSettings, Selector};

use super::options::ProcessOptions;
use super::registry::Entry;
use super::urls::chain_stage;
use crate::error::{BoxError, TransformError};
use crate::page::Page;

/// An element selector paired with its handlers, as built by `lol_html::element!`.
pub type ElementHandler<'h> = (Cow<'static, Selector>, ElementContentHandlers<'h>);

/// Builds a stage for one document.
pub type PluginFn = dyn for<'c> Fn(&'c Page) -> Stage<'c> + Send + Sync;

/// Rewrites one URL found in a document.
pub type UrlCallbackFn = dyn Fn(&Page, &str) -> Result<String, BoxError> + Send + Sync;

/// Handlers contributed by one plugin for one document.
///
/// ```ignore
/// use lol_html::element;
///
/// let stage = Stage::new().on(element!("img", |el| {
///     el.set_attribute("loading", "lazy")?;
///     Ok(())
/// }));
/// ```
#[derive(Default)]
pub struct Stage<'h> {
    element_handlers: Vec<ElementHandler<'h>>,
    document_handlers: Vec<DocumentContentHandlers<'h>>,
}

impl<'h> Stage<'h> {
    /// Create a stage with no handlers.
    pub fn new() -> Self {
        Self {
            element_handlers: Vec::new(),
            document_handlers: Vec::new(),
        }
    }

    /// Add element handlers for a selector.
    pub fn on(mut self, handler: ElementHandler<'h>) -> Self {
        self.element_handlers.push(handler);
        self
    }

    /// Add document-level handlers (comments, text, doctype, end).
    pub fn on_document(mut self, handlers: DocumentContentHandlers<'h>) -> Self {
        self.document_handlers.push(handlers);
        self
    }

    /// Whether the stage would touch the document at all.
    pub fn is_empty(&self) -> bool {
        self.element_handlers.is_empty() && self.document_handlers.is_empty()
    }
}

/// Box a plugin factory.
///
/// Passing the closure through this bound lets the compiler tie the returned
/// stage's lifetime to the page it borrows.
pub fn plugin<F>(factory: F) -> Arc<PluginFn>
where
    F: for<'c> Fn(&'c Page) -> Stage<'c> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Box a URL callback.
pub fn url_callback<F>(callback: F) -> Arc<UrlCallbackFn>
where
    F: Fn(&Page, &str) -> Result<String, BoxError> + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Build the stages for one document: plugins in registry order, then the
/// URL aggregation stage if any callbacks are registered.
pub(crate) fn compose<'c>(
    plugins: &'c [Entry<Arc<PluginFn>>],
    callbacks: &'c [Entry<Arc<UrlCallbackFn>>],
    page: &'c Page,
) -> Vec<Stage<'c>> {
    let mut stages: Vec<Stage<'c>> = plugins.iter().map(|entry| (entry.value)(page)).collect();

    if !callbacks.is_empty() {
        let chain = callbacks.iter().map(|entry| entry.value.as_ref()).collect();
        stages.push(chain_stage(chain, page));
    }

    stages
}

/// Run content through the stages in order, each stage rewriting the output
/// of the one before it.
///
/// Markup inserted by a stage is visible to every later stage, including
/// the URL aggregation stage. Stages without handlers are skipped.
pub(crate) fn rewrite(
    content: &str,
    stages: Vec<Stage<'_>>,
    options: &ProcessOptions,
) -> Result<String, TransformError> {
    let mut output = Cow::Borrowed(content);
    for stage in stages.into_iter().filter(|stage| !stage.is_empty()) {
        output = Cow::Owned(rewrite_stage(&output, stage, options)?);
    }
    Ok(output.into_owned())
}

fn rewrite_stage(
    content: &str,
    stage: Stage<'_>,
    options: &ProcessOptions,
) -> Result<String, TransformError> {
    #[allow(clippy::needless_update)]
    let settings = RewriteStrSettings {
        element_content_handlers: stage.element_handlers,
        document_content_handlers: stage.document_handlers,
        strict: options.strict_or_default(),
        enable_esi_tags: options.esi_or_default(),
        ..RewriteStrSettings::default()
    };

    Ok(lol_html::rewrite_str(content, settings)?)
}
