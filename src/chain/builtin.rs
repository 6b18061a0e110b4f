//! Built-in named transforms selectable from configuration.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use super::{Transform, TransformContext, Transforms};
use crate::error::{BoxError, TransformError};
use crate::transform::{self, ProcessOptions};

/// Trims surrounding whitespace.
pub struct Trim;

impl Transform for Trim {
    fn apply<'a>(
        &'a self,
        _ctx: &'a TransformContext,
        content: String,
        _output_path: &'a str,
    ) -> BoxFuture<'a, Result<String, BoxError>> {
        future::ready(Ok(content.trim().to_string())).boxed()
    }
}

/// Removes HTML comments.
#[derive(Default)]
pub struct StripComments {
    pub options: ProcessOptions,
}

impl Transform for StripComments {
    fn apply<'a>(
        &'a self,
        _ctx: &'a TransformContext,
        content: String,
        _output_path: &'a str,
    ) -> BoxFuture<'a, Result<String, BoxError>> {
        let result = transform::transform_standalone(
            &content,
            transform::builtin::strip_comments,
            &self.options,
        )
        .map_err(BoxError::from);
        future::ready(result).boxed()
    }
}

/// Look up a built-in transform by name.
pub fn by_name(name: &str, options: &ProcessOptions) -> Option<Arc<dyn Transform>> {
    match name {
        "trim" => Some(Arc::new(Trim)),
        "strip-comments" => Some(Arc::new(StripComments { options: *options })),
        _ => None,
    }
}

/// Build a chain from built-in names, in the given order.
pub fn from_names<S: AsRef<str>>(
    names: &[S],
    options: &ProcessOptions,
) -> Result<Transforms, TransformError> {
    let mut transforms = Transforms::new();
    for name in names {
        let name = name.as_ref();
        let transform = by_name(name, options).ok_or_else(|| {
            TransformError::configuration(format!("unknown transform `{name}`"))
        })?;
        transforms.insert_arc(name, transform);
    }
    Ok(transforms)
}
