mod assignment;
mod leaf_linker;
mod leaf_state;
mod link_table;
mod mask;
mod overlap;
mod rect;
mod trajectory;

pub use assignment::{LinkVector, filter_columns, solve_links};
pub use leaf_linker::{LeafLinker, LinkerConfig};
pub use leaf_state::LeafState;
pub use link_table::LinkTable;
pub use mask::{AvailableLeaves, Frame, FrameSequence, Mask, SCORE_CUTOFF};
pub use overlap::{OverlapMode, compute_overlaps};
pub use rect::Rect;
pub use trajectory::{Emergence, FrameCounts, LeafId, LeafSeries, LeafTrack, Trajectory};
