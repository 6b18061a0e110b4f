//! Named transform chains.
//!
//! A chain is an ordered list of named transforms run manually over a piece
//! of output content, e.g. to render the transforms of one page into another
//! format. Each transform receives the previous transform's output.
//!
//! ```ignore
//! let mut transforms = Transforms::new();
//! transforms
//!     .insert_fn("prefix", |_ctx, content, _path| Ok(format!("x{content}")))
//!     .insert_fn("suffix", |_ctx, content, _path| Ok(format!("{content}y")));
//!
//! let output = run_all("0".to_string(), &page, &transforms, Some(".json")).await?;
//! assert_eq!(output, "x0y");
//! ```

pub mod builtin;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use crate::error::{BoxError, TransformError};
use crate::page::Page;
use crate::paths::{is_matching_extension, override_output_path};

/// What every transform of one [`run_all`] call can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformContext {
    pub input_path: String,
    /// Output path after the extension override
    pub output_path: String,
    pub url: String,
    /// The page, with its output path overridden
    pub page: Page,
}

impl TransformContext {
    fn new(page: &Page, output_path: String) -> Self {
        Self {
            input_path: page.input_path.clone(),
            url: page.url.clone(),
            page: page.with_output_path(output_path.clone()),
            output_path,
        }
    }
}

/// A named step of a transform chain.
///
/// Implemented for synchronous closures taking
/// `(&TransformContext, content, original_output_path)`; wrap async closures
/// in [`AsyncFn`].
pub trait Transform: Send + Sync {
    fn apply<'a>(
        &'a self,
        ctx: &'a TransformContext,
        content: String,
        output_path: &'a str,
    ) -> BoxFuture<'a, Result<String, BoxError>>;
}

impl<F> Transform for F
where
    F: Fn(&TransformContext, String, &str) -> Result<String, BoxError> + Send + Sync,
{
    fn apply<'a>(
        &'a self,
        ctx: &'a TransformContext,
        content: String,
        output_path: &'a str,
    ) -> BoxFuture<'a, Result<String, BoxError>> {
        future::ready(self(ctx, content, output_path)).boxed()
    }
}

/// Adapts an async closure into a [`Transform`].
///
/// The closure receives owned copies of the context and output path so the
/// returned future does not borrow from the chain.
pub struct AsyncFn<F>(pub F);

impl<F, Fut> Transform for AsyncFn<F>
where
    F: Fn(TransformContext, String, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    fn apply<'a>(
        &'a self,
        ctx: &'a TransformContext,
        content: String,
        output_path: &'a str,
    ) -> BoxFuture<'a, Result<String, BoxError>> {
        (self.0)(ctx.clone(), content, output_path.to_string()).boxed()
    }
}

/// A transform paired with its name, in chain order.
#[derive(Clone)]
pub struct TransformDescriptor {
    pub name: String,
    pub callback: Arc<dyn Transform>,
}

impl std::fmt::Debug for TransformDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Named transforms in declaration order.
///
/// Names are checked when the chain runs, not on insert: a set with an empty
/// or repeated name is rejected by [`run_all`] before anything executes.
#[derive(Clone, Default)]
pub struct Transforms {
    entries: Vec<(String, Arc<dyn Transform>)>,
}

impl std::fmt::Debug for Transforms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transforms")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform.
    pub fn insert<T>(&mut self, name: impl Into<String>, transform: T) -> &mut Self
    where
        T: Transform + 'static,
    {
        self.insert_arc(name, Arc::new(transform))
    }

    /// Append an already shared transform.
    pub fn insert_arc(
        &mut self,
        name: impl Into<String>,
        transform: Arc<dyn Transform>,
    ) -> &mut Self {
        self.entries.push((name.into(), transform));
        self
    }

    /// Append a synchronous closure.
    pub fn insert_fn<F>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(&TransformContext, String, &str) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.insert(name, transform)
    }

    /// Append an async closure.
    pub fn insert_async<F, Fut>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(TransformContext, String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
    {
        self.insert(name, AsyncFn(transform))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Check that every name is non-empty and unique.
    pub fn validate(&self) -> Result<(), TransformError> {
        let mut seen = HashSet::new();
        for name in self.names() {
            if name.trim().is_empty() {
                return Err(TransformError::configuration(
                    "transform names cannot be empty",
                ));
            }
            if !seen.insert(name) {
                return Err(TransformError::configuration(format!(
                    "transform `{name}` is declared more than once"
                )));
            }
        }
        Ok(())
    }

    /// Validate and flatten into descriptors, keeping declaration order.
    pub fn to_descriptors(&self) -> Result<Vec<TransformDescriptor>, TransformError> {
        self.validate()?;
        Ok(self
            .entries
            .iter()
            .map(|(name, callback)| TransformDescriptor {
                name: name.clone(),
                callback: callback.clone(),
            })
            .collect())
    }
}

impl<S: Into<String>> FromIterator<(S, Arc<dyn Transform>)> for Transforms {
    fn from_iter<I: IntoIterator<Item = (S, Arc<dyn Transform>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, transform)| (name.into(), transform))
                .collect(),
        }
    }
}

/// Run every transform over `content`, in declaration order.
///
/// `extension_override` changes the output path the transforms see (see
/// [`override_output_path`]); the original path is still passed as their
/// third argument. Overriding to the extension the page already has is
/// refused: those transforms already ran on this output automatically.
///
/// The first failing transform aborts the chain. No partial output is
/// returned.
pub async fn run_all(
    content: String,
    page: &Page,
    transforms: &Transforms,
    extension_override: Option<&str>,
) -> Result<String, TransformError> {
    let extension_override = extension_override.filter(|ext| !ext.is_empty());
    if let Some(extension) = extension_override {
        if is_matching_extension(&page.output_path, extension) {
            return Err(TransformError::DoubleProcessing {
                output_path: page.output_path.clone(),
            });
        }
    }

    let descriptors = transforms.to_descriptors()?;
    let ctx = TransformContext::new(
        page,
        override_output_path(&page.output_path, extension_override),
    );

    let mut content = content;
    for TransformDescriptor { name, callback } in &descriptors {
        tracing::debug!(
            transform = %name,
            input_path = %page.input_path,
            output_path = %page.output_path,
            "running transform"
        );

        let had_content = !content.is_empty();
        content = callback
            .apply(&ctx, content, &page.output_path)
            .await
            .map_err(|source| TransformError::Execution {
                name: name.clone(),
                input_path: page.input_path.clone(),
                output_path: page.output_path.clone(),
                source,
            })?;

        if had_content && content.is_empty() {
            tracing::warn!(
                "transform `{name}` returned empty when writing {} from {}",
                page.output_path,
                page.input_path
            );
        }
    }

    Ok(content)
}
