//! TrackingPipeline for combining segmentation with leaf linking.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::linker::{
    Frame, FrameCounts, FrameSequence, LeafLinker, LeafSeries, LinkTable, LinkerConfig,
};

use super::{IntoMasks, MaskSource};

/// Everything produced for one image sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingReport {
    pub table: LinkTable,
    pub series: LeafSeries,
}

impl TrackingReport {
    pub fn frame_counts(&self) -> Vec<FrameCounts> {
        self.series.frame_counts()
    }
}

/// Collects segmented frames from a `MaskSource` and links them once complete.
///
/// Linking needs the whole sequence, so frames are buffered until `finish`.
pub struct TrackingPipeline<S: MaskSource> {
    source: S,
    linker: LeafLinker,
    frames: Vec<Frame>,
}

impl<S: MaskSource> TrackingPipeline<S> {
    /// Create a new pipeline with the given source and linker config.
    pub fn new(source: S, config: LinkerConfig) -> Result<Self> {
        Ok(Self {
            source,
            linker: LeafLinker::new(config)?,
            frames: Vec::new(),
        })
    }

    /// Create a new pipeline with the default linker configuration.
    pub fn with_default_config(source: S) -> Self {
        Self {
            source,
            linker: LeafLinker::default(),
            frames: Vec::new(),
        }
    }

    /// Segment one image and append its masks as the next frame.
    ///
    /// Returns the number of leaves found, or the segmentation error.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> std::result::Result<usize, S::Error> {
        let masks = self.source.segment(input, width, height)?;
        Ok(self.push_masks(masks))
    }

    /// Append an already segmented frame.
    pub fn push_masks(&mut self, masks: impl IntoMasks) -> usize {
        let frame = Frame::new(masks.into_masks());
        let count = frame.num_leaves();
        self.frames.push(frame);
        count
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Validate the buffered frames, link them and build trajectories.
    pub fn finish(self) -> Result<TrackingReport> {
        let frames = FrameSequence::new(self.frames)?;
        let (table, series) = self.linker.track(&frames)?;
        Ok(TrackingReport { table, series })
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn linker(&self) -> &LeafLinker {
        &self.linker
    }
}
