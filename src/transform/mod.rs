//! Per-extension document transformation.
//!
//! Plugins and URL callbacks are registered per output file extension with a
//! priority. For every document whose extension has registrations, the
//! [`Transformer`] composes a fresh set of stages bound to that document's
//! [`Page`] and drives the content through them in order, each stage
//! rewriting the previous stage's output:
//!
//! 1. Plugin stages, highest priority first
//! 2. One URL aggregation stage (only if URL callbacks are registered)
//!
//! # Registering stages
//!
//! ```ignore
//! use lol_html::element;
//!
//! let mut transformer = Transformer::new();
//! transformer.set_benchmarks(Arc::new(Aggregate::new()));
//! transformer.add_plugin("html", |page| {
//!     Stage::new().on(element!("body", move |el| {
//!         el.set_attribute("data-url", &page.url)?;
//!         Ok(())
//!     }))
//! }, RegisterOptions::default());
//! transformer.add_url_transform("html,xml", |_page, url| Ok(url.to_string()), RegisterOptions::priority(-1));
//! ```

mod bench;
pub mod builtin;
mod options;
mod registry;
mod stage;
mod urls;

use std::sync::Arc;

pub use bench::{Aggregate, BenchStat, Measurement};
pub use options::{ProcessOptions, RegisterOptions};
pub use registry::{Entry, PriorityRegistry, split_extensions};
pub use stage::{ElementHandler, PluginFn, Stage, UrlCallbackFn, plugin, url_callback};

use crate::error::{BoxError, TransformError};
use crate::page::Page;
use crate::paths::file_extension;

/// Registry of per-extension stages and the runner that applies them.
///
/// Registration takes `&mut self` and happens during setup. Once built, a
/// `Transformer` is read-only and can be shared across threads to process
/// documents concurrently; every [`run`](Self::run) builds its own stages.
#[derive(Default)]
pub struct Transformer {
    plugins: PriorityRegistry<Arc<PluginFn>>,
    callbacks: PriorityRegistry<Arc<UrlCallbackFn>>,
    process_options: ProcessOptions,
    benchmarks: Option<Arc<Aggregate>>,
}

impl Transformer {
    /// Create a transformer with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the timing aggregate every run reports to.
    pub fn set_benchmarks(&mut self, benchmarks: Arc<Aggregate>) -> &mut Self {
        self.benchmarks = Some(benchmarks);
        self
    }

    /// Register a plugin factory for a comma-separated list of extensions.
    pub fn add_plugin<F>(
        &mut self,
        extensions: &str,
        factory: F,
        options: RegisterOptions,
    ) -> &mut Self
    where
        F: for<'c> Fn(&'c Page) -> Stage<'c> + Send + Sync + 'static,
    {
        self.add_boxed_plugin(extensions, plugin(factory), options)
    }

    /// Register an already boxed plugin factory.
    pub fn add_boxed_plugin(
        &mut self,
        extensions: &str,
        factory: Arc<PluginFn>,
        options: RegisterOptions,
    ) -> &mut Self {
        self.plugins.add(extensions, factory, options.priority);
        self
    }

    /// Register a URL callback for a comma-separated list of extensions.
    pub fn add_url_transform<F>(
        &mut self,
        extensions: &str,
        callback: F,
        options: RegisterOptions,
    ) -> &mut Self
    where
        F: Fn(&Page, &str) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.add_boxed_url_transform(extensions, url_callback(callback), options)
    }

    /// Register an already boxed URL callback.
    pub fn add_boxed_url_transform(
        &mut self,
        extensions: &str,
        callback: Arc<UrlCallbackFn>,
        options: RegisterOptions,
    ) -> &mut Self {
        self.callbacks.add(extensions, callback, options.priority);
        self
    }

    /// Merge engine options into the options used for every run.
    pub fn set_process_options(&mut self, options: ProcessOptions) -> &mut Self {
        self.process_options.merge(options);
        self
    }

    pub fn process_options(&self) -> &ProcessOptions {
        &self.process_options
    }

    /// Check if anything is registered for an extension.
    pub fn is_transformable(&self, extension: &str) -> bool {
        self.plugins.contains(extension) || self.callbacks.contains(extension)
    }

    /// Plugin entries for an extension, highest priority first.
    pub fn plugins_for(&self, extension: &str) -> &[Entry<Arc<PluginFn>>] {
        self.plugins.get(extension)
    }

    /// URL callback entries for an extension, highest priority first.
    pub fn url_transforms_for(&self, extension: &str) -> &[Entry<Arc<UrlCallbackFn>>] {
        self.callbacks.get(extension)
    }

    /// Transform one document's content.
    ///
    /// Content for extensions with no registrations is returned as is.
    /// Errors from the engine or from any stage are returned unchanged.
    pub fn run(
        &self,
        output_path: &str,
        content: String,
        page: &Page,
    ) -> Result<String, TransformError> {
        let extension = file_extension(output_path);
        if !self.is_transformable(extension) {
            return Ok(content);
        }

        let benchmarks = self.benchmarks.as_ref().ok_or_else(|| {
            TransformError::configuration(
                "missing benchmark aggregate; call `Transformer::set_benchmarks` before running",
            )
        })?;

        tracing::debug!(output_path, extension, "transforming document");
        let bench = benchmarks.before(format!("Transforming `{extension}` with lol_html"));
        let stages = stage::compose(
            self.plugins.get(extension),
            self.callbacks.get(extension),
            page,
        );
        let output = stage::rewrite(&content, stages, &self.process_options)?;
        bench.after();

        Ok(output)
    }
}

/// Run one plugin over content without a registry or instrumentation.
///
/// The plugin sees a default [`Page`].
pub fn transform_standalone<F>(
    content: &str,
    factory: F,
    options: &ProcessOptions,
) -> Result<String, TransformError>
where
    F: for<'c> Fn(&'c Page) -> Stage<'c>,
{
    let page = Page::default();
    stage::rewrite(content, vec![factory(&page)], options)
}

/// Run one URL callback over every URL in content, without a registry.
pub fn rewrite_urls_standalone<F>(
    content: &str,
    callback: F,
    options: &ProcessOptions,
) -> Result<String, TransformError>
where
    F: Fn(&Page, &str) -> Result<String, BoxError>,
{
    let page = Page::default();
    let stage = urls::url_stage(|url| callback(&page, url));
    stage::rewrite(content, vec![stage], options)
}
