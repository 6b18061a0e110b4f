//! Priority-ordered content transformation for generated site output.
//!
//! Two cores live here:
//! - [`transform`]: per-extension plugin stages and URL callbacks, run in
//!   priority order, each stage rewriting the previous stage's output.
//! - [`chain`]: named transform chains run manually over arbitrary content,
//!   with output path override and per-stage error wrapping.

pub mod chain;
pub mod config;
pub mod error;
pub mod page;
pub mod paths;
pub mod transform;

pub use chain::{Transform, TransformContext, TransformDescriptor, Transforms, run_all};
pub use error::{BoxError, TransformError};
pub use page::Page;
pub use transform::{
    Aggregate, ProcessOptions, RegisterOptions, Stage, Transformer, rewrite_urls_standalone,
    transform_standalone,
};
