//! Trait for instance segmentation backends.

use ndarray::{Array3, Axis};

use crate::linker::Mask;

/// Trait for instance segmentation backends.
///
/// Implement this trait to feed any leaf segmentation model into the linker.
///
/// # Example
///
/// ```ignore
/// use leaftrack_rs::{Mask, MaskSource};
///
/// struct MySegmenter {
///     // Your model here
/// }
///
/// impl MaskSource for MySegmenter {
///     type Error = std::io::Error;
///
///     fn segment(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Mask>, Self::Error> {
///         // Run inference and return one mask per leaf
///         Ok(vec![])
///     }
/// }
/// ```
pub trait MaskSource {
    /// Error type for segmentation failures.
    type Error;

    /// Segment one image into leaf masks of `height x width` pixels.
    fn segment(&mut self, input: &[u8], width: u32, height: u32)
    -> Result<Vec<Mask>, Self::Error>;
}

/// Conversion from segmenter-specific output into leaf masks.
pub trait IntoMasks {
    fn into_masks(self) -> Vec<Mask>;
}

impl IntoMasks for Vec<Mask> {
    fn into_masks(self) -> Vec<Mask> {
        self
    }
}

/// `[height, width, instances]` stack, one instance per leaf.
impl IntoMasks for Array3<bool> {
    fn into_masks(self) -> Vec<Mask> {
        self.axis_iter(Axis(2))
            .map(|plane| Mask::new(plane.to_owned()))
            .collect()
    }
}
