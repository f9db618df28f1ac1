//! Integration module for connecting segmentation backends with the leaf linker.
//!
//! Segmentation itself is external: a backend turns each image into leaf
//! masks, and the pipeline collects them into a sequence for linking.

mod builder;
mod pipeline;
mod source;

pub use builder::MaskBuilder;
pub use pipeline::{TrackingPipeline, TrackingReport};
pub use source::{IntoMasks, MaskSource};
