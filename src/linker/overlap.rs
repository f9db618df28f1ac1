//! Pairwise mask overlap between two consecutive frames.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};
use crate::linker::mask::Mask;

/// How the overlap of two masks is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapMode {
    /// Intersection over union.
    #[default]
    Iou,
    /// Intersection over the area of the earlier mask.
    IntersectionOverPrevious,
}

impl OverlapMode {
    /// Overlap of `a` (time t) with `b` (time t+1). Zero denominators give 0.
    /// Callers check that both masks share one size.
    fn score(self, a: &Mask, b: &Mask) -> f64 {
        let intersection = a.intersection(b);
        let denominator = match self {
            OverlapMode::Iou => a.area() + b.area() - intersection,
            OverlapMode::IntersectionOverPrevious => a.area(),
        };
        if denominator == 0 {
            0.0
        } else {
            intersection as f64 / denominator as f64
        }
    }
}

/// Compute the `masks0.len() x masks1.len()` overlap matrix.
///
/// Either side may be empty, giving a matrix with a zero dimension.
/// All masks must share one spatial size.
pub fn compute_overlaps(masks0: &[Mask], masks1: &[Mask], mode: OverlapMode) -> Result<Array2<f64>> {
    let mut overlaps = Array2::zeros((masks0.len(), masks1.len()));
    let Some(expected) = masks0.first().or(masks1.first()).map(Mask::dim) else {
        return Ok(overlaps);
    };
    check_dims(masks0, expected, 0)?;
    check_dims(masks1, expected, 1)?;

    for (i, a) in masks0.iter().enumerate() {
        for (j, b) in masks1.iter().enumerate() {
            overlaps[[i, j]] = mode.score(a, b);
        }
    }
    Ok(overlaps)
}

/// `frame` is relative to the pair: 0 for t, 1 for t+1.
fn check_dims(masks: &[Mask], expected: (usize, usize), frame: usize) -> Result<()> {
    match masks.iter().position(|m| m.dim() != expected) {
        Some(leaf) => Err(LinkError::DimensionMismatch {
            frame,
            leaf,
            expected,
            got: masks[leaf].dim(),
        }),
        None => Ok(()),
    }
}
