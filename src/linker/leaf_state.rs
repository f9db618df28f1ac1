use serde::{Deserialize, Serialize};

/// Lifecycle of one leaf identity over the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeafState {
    /// Not yet emerged
    #[default]
    Unseen,
    /// Occupies a leaf index at this frame
    Active,
    /// No longer tracked; terminal
    Lost,
}
