//! Transformation error types.

/// Boxed error returned by stages, URL callbacks and named transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering or running transforms.
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("invalid transform configuration: {0}")]
    Configuration(String),

    #[error(
        "refusing to run transforms manually on {output_path}: they already run automatically \
         for this output path, and double-processing content will lead to unexpected output"
    )]
    DoubleProcessing { output_path: String },

    #[error("transform `{name}` encountered an error when transforming {input_path}")]
    Execution {
        name: String,
        input_path: String,
        output_path: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

impl TransformError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
