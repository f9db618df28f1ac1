//! Persistent leaf identities chained forward through the link table.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LinkError, Result};
use crate::linker::leaf_state::LeafState;
use crate::linker::link_table::LinkTable;
use crate::linker::mask::FrameSequence;

/// Globally unique leaf identity, assigned in order of first observation.
pub type LeafId = usize;

/// Leaf index occupied at each frame, `None` before emergence and after loss.
pub type Trajectory = Vec<Option<usize>>;

/// One identity and where it sits over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafTrack {
    pub id: LeafId,
    /// Frame at which the leaf first appeared
    pub start_frame: usize,
    /// Leaf index at `start_frame`
    pub start_leaf: usize,
    pub trajectory: Trajectory,
}

impl LeafTrack {
    /// Last frame at which the leaf was tracked, `None` if it never was.
    pub fn last_frame(&self) -> Option<usize> {
        self.lifetime()
            .checked_sub(1)
            .map(|tracked| self.start_frame + tracked)
    }

    /// Number of consecutive frames the leaf was tracked for.
    pub fn lifetime(&self) -> usize {
        self.trajectory
            .get(self.start_frame..)
            .map_or(0, |tail| tail.iter().take_while(|leaf| leaf.is_some()).count())
    }

    pub fn leaf_at(&self, t: usize) -> Option<usize> {
        self.trajectory.get(t).copied().flatten()
    }

    pub fn state_at(&self, t: usize) -> LeafState {
        if t < self.start_frame {
            LeafState::Unseen
        } else if self.leaf_at(t).is_some() {
            LeafState::Active
        } else {
            LeafState::Lost
        }
    }
}

/// A leaf that has no incoming link at its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emergence {
    pub leaf: usize,
    pub id: LeafId,
}

/// Per-frame identity bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounts {
    /// Identities active at this frame
    pub total: usize,
    /// Identities introduced at this frame
    pub emerged: usize,
    /// Identities active at the previous frame but not at this one
    pub lost: usize,
}

/// Trajectories of every identity in a linked sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSeries {
    num_frames: usize,
    tracks: Vec<LeafTrack>,
    emergences: Vec<Vec<Emergence>>,
    occupancy: Vec<Vec<Option<LeafId>>>,
}

impl LeafSeries {
    /// Detect emergences frame by frame and chain each new identity forward.
    ///
    /// Runs sequentially: frame `t` depends on the completed links of `t-1`.
    pub fn build(frames: &FrameSequence, table: &LinkTable) -> Result<Self> {
        let num_frames = frames.len();
        check_table(frames, table)?;

        let mut next_id: LeafId = 0;
        let mut emergences = Vec::with_capacity(num_frames);
        for (t, frame) in frames.frames().iter().enumerate() {
            let mut linked = vec![false; frame.num_leaves()];
            if let Some(links) = t.checked_sub(1).and_then(|p| table.link(p)) {
                for &j in links.iter().flatten() {
                    linked[j] = true;
                }
            }

            let emerged: Vec<Emergence> = frame
                .available()
                .iter()
                .filter(|&leaf| !linked[leaf])
                .map(|leaf| {
                    let id = next_id;
                    next_id += 1;
                    Emergence { leaf, id }
                })
                .collect();
            if t > 0 && !emerged.is_empty() {
                debug!(frame = t, count = emerged.len(), "new leaves emerged");
            }
            emergences.push(emerged);
        }

        let mut occupancy: Vec<Vec<Option<LeafId>>> = frames
            .frames()
            .iter()
            .map(|f| vec![None; f.num_leaves()])
            .collect();
        let mut tracks = Vec::with_capacity(next_id);
        for (t0, emerged) in emergences.iter().enumerate() {
            for &Emergence { leaf, id } in emerged {
                let trajectory = chain(table, num_frames, t0, leaf);
                for (t, slot) in trajectory.iter().enumerate() {
                    if let Some(j) = *slot {
                        occupancy[t][j] = Some(id);
                    }
                }
                tracks.push(LeafTrack {
                    id,
                    start_frame: t0,
                    start_leaf: leaf,
                    trajectory,
                });
            }
        }

        info!(
            frames = num_frames,
            identities = tracks.len(),
            initial = emergences.first().map_or(0, Vec::len),
            "built leaf trajectories"
        );
        Ok(Self {
            num_frames,
            tracks,
            emergences,
            occupancy,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_identities(&self) -> usize {
        self.tracks.len()
    }

    /// All tracks, indexed by identity.
    pub fn tracks(&self) -> &[LeafTrack] {
        &self.tracks
    }

    pub fn track(&self, id: LeafId) -> Option<&LeafTrack> {
        self.tracks.get(id)
    }

    pub fn trajectory(&self, id: LeafId) -> Option<&Trajectory> {
        self.track(id).map(|track| &track.trajectory)
    }

    /// Leaves first observed at frame `t`, in ascending leaf order.
    pub fn emergences(&self, t: usize) -> &[Emergence] {
        self.emergences.get(t).map(Vec::as_slice).unwrap_or_default()
    }

    /// Identity occupying `leaf` at frame `t`.
    pub fn identity_at(&self, t: usize, leaf: usize) -> Option<LeafId> {
        self.occupancy.get(t)?.get(leaf).copied().flatten()
    }

    /// Identities active at frame `t`, in ascending order.
    pub fn active_at(&self, t: usize) -> Vec<LeafId> {
        self.tracks
            .iter()
            .filter(|track| track.state_at(t) == LeafState::Active)
            .map(|track| track.id)
            .collect()
    }

    pub fn frame_counts(&self) -> Vec<FrameCounts> {
        (0..self.num_frames)
            .map(|t| FrameCounts {
                total: self.active_at(t).len(),
                emerged: self.emergences(t).len(),
                lost: t.checked_sub(1).map_or(0, |prev| {
                    self.tracks
                        .iter()
                        .filter(|track| {
                            track.state_at(prev) == LeafState::Active
                                && track.state_at(t) == LeafState::Lost
                        })
                        .count()
                }),
            })
            .collect()
    }
}

/// Follow links from `leaf` at frame `t0` until the chain breaks.
fn chain(table: &LinkTable, num_frames: usize, t0: usize, leaf: usize) -> Trajectory {
    let mut trajectory = vec![None; num_frames];
    trajectory[t0] = Some(leaf);
    let mut current = leaf;
    for t in t0 + 1..num_frames {
        match table.link(t - 1).and_then(|links| links[current]) {
            Some(next) => {
                trajectory[t] = Some(next);
                current = next;
            }
            None => break,
        }
    }
    trajectory
}

/// The table must describe exactly this sequence's frame pairs and leaf counts.
fn check_table(frames: &FrameSequence, table: &LinkTable) -> Result<()> {
    let num_frames = frames.len();
    if table.num_pairs() + 1 != num_frames {
        return Err(LinkError::TableMismatch {
            frames: num_frames,
            pairs: table.num_pairs(),
        });
    }

    let counts = frames.num_leaves();
    for (t, links) in table.links().iter().enumerate() {
        if links.len() != counts[t] {
            return Err(LinkError::LeafOutOfRange {
                frame: t,
                leaf: links.len(),
                count: counts[t],
            });
        }
        let (sources, targets) = (frames.frame(t)?.available(), frames.frame(t + 1)?.available());
        let mut claimed = vec![false; counts[t + 1]];
        for (leaf, &target) in links.iter().enumerate() {
            let Some(target) = target else { continue };
            if target >= counts[t + 1] {
                return Err(LinkError::InvalidLink {
                    frame: t,
                    leaf,
                    target,
                });
            }
            if !sources.contains(leaf) {
                return Err(LinkError::ExcludedLink { frame: t, leaf });
            }
            if !targets.contains(target) {
                return Err(LinkError::ExcludedLink {
                    frame: t + 1,
                    leaf: target,
                });
            }
            if std::mem::replace(&mut claimed[target], true) {
                return Err(LinkError::DuplicateTarget {
                    frame: t + 1,
                    target,
                });
            }
        }
    }
    Ok(())
}
