//! Error types for leaf linking.

use thiserror::Error;

/// Errors raised by the linking engine.
///
/// All variants are precondition failures: the core never retries and a
/// failure in any frame pair aborts the whole sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("frame sequence is empty")]
    EmptySequence,

    #[error(
        "mask {leaf} of frame {frame} has dimensions {got:?}, expected {expected:?}"
    )]
    DimensionMismatch {
        frame: usize,
        leaf: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("mask contains non-binary value {value}")]
    NonBinaryMask { value: u8 },

    #[error("match threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("frame {frame} out of range for sequence of {len} frames")]
    FrameOutOfRange { frame: usize, len: usize },

    #[error("leaf {leaf} out of range for frame {frame} with {count} leaves")]
    LeafOutOfRange {
        frame: usize,
        leaf: usize,
        count: usize,
    },

    #[error("link table covers {pairs} frame pairs but the sequence has {frames} frames")]
    TableMismatch { frames: usize, pairs: usize },

    #[error("link from leaf {leaf} of frame {frame} targets missing leaf {target}")]
    InvalidLink {
        frame: usize,
        leaf: usize,
        target: usize,
    },

    #[error("leaf {target} of frame {frame} is linked from more than one leaf")]
    DuplicateTarget { frame: usize, target: usize },

    #[error("link touches excluded leaf {leaf} of frame {frame}")]
    ExcludedLink { frame: usize, leaf: usize },

    #[error("assignment solver failed: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
