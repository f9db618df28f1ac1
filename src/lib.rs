//! Leaf tracking across time-ordered instance segmentation results.
//!
//! Each frame is a set of binary leaf masks. Consecutive frames are linked
//! by mask overlap with a thresholded one-to-one assignment, and the links
//! are chained into one trajectory per persistent leaf identity.
//!
//! ```ignore
//! use leaftrack_rs::{FrameSequence, LeafLinker, LinkerConfig};
//!
//! let frames = FrameSequence::from_masks(masks_per_frame)?;
//! let linker = LeafLinker::new(LinkerConfig::default())?;
//! let (table, series) = linker.track(&frames)?;
//! for track in series.tracks() {
//!     println!("leaf {} -> {:?}", track.id, track.trajectory);
//! }
//! ```

pub mod error;
pub mod integration;
pub mod linker;

pub use error::{LinkError, Result};
pub use integration::{IntoMasks, MaskBuilder, MaskSource, TrackingPipeline, TrackingReport};
pub use linker::{
    Emergence, Frame, FrameCounts, FrameSequence, LeafId, LeafLinker, LeafSeries, LeafState,
    LeafTrack, LinkTable, LinkVector, LinkerConfig, Mask, OverlapMode, Rect, Trajectory,
};
