//! The document currently being transformed.

use serde::{Deserialize, Serialize};

/// Describes one output document.
///
/// A `Page` is the per-call context of the document pipeline: every plugin
/// factory and URL callback of a [`Transformer::run`](crate::Transformer::run)
/// call borrows the same page. It is also the page data handed to
/// [`run_all`](crate::run_all).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Source file the content was generated from
    #[serde(default)]
    pub input_path: String,
    /// Where the content will be written
    #[serde(default)]
    pub output_path: String,
    /// URL at which the content will be served
    #[serde(default)]
    pub url: String,
}

impl Page {
    pub fn new(
        input_path: impl Into<String>,
        output_path: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            url: url.into(),
        }
    }

    /// Copy of this page written to a different output path.
    pub fn with_output_path(&self, output_path: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            ..self.clone()
        }
    }
}
