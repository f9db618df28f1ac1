//! Per-frame-pair similarity matrices and link vectors.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::linker::assignment::{self, LinkVector};
use crate::linker::leaf_linker::LinkerConfig;
use crate::linker::mask::FrameSequence;
use crate::linker::overlap;

/// Linking results for every consecutive frame pair `(t, t+1)`.
///
/// Slot `t` of both vectors describes the pair `(t, t+1)`, so a sequence of
/// `T` frames yields `T - 1` slots. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTable {
    threshold: f64,
    similarities: Vec<Array2<f64>>,
    links: Vec<LinkVector>,
}

impl LinkTable {
    /// Link every consecutive pair of `frames`.
    ///
    /// Pairs are independent of each other; with the `parallel` feature
    /// they are spread over the rayon thread pool.
    pub fn build(frames: &FrameSequence, config: &LinkerConfig) -> Result<Self> {
        config.validate()?;
        let num_pairs = frames.len().saturating_sub(1);

        #[cfg(feature = "parallel")]
        let pairs = (0..num_pairs)
            .into_par_iter()
            .map(|t| link_pair(frames, t, config))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let pairs = (0..num_pairs)
            .map(|t| link_pair(frames, t, config))
            .collect::<Result<Vec<_>>>()?;

        let (similarities, links): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        let table = Self {
            threshold: config.threshold,
            similarities,
            links,
        };

        info!(
            frames = frames.len(),
            pairs = num_pairs,
            matched = (0..num_pairs).map(|t| table.matched_pairs(t).len()).sum::<usize>(),
            "linked frame sequence"
        );
        Ok(table)
    }

    /// Threshold the table was built with.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of frame pairs, `T - 1`.
    pub fn num_pairs(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[LinkVector] {
        &self.links
    }

    pub fn similarities(&self) -> &[Array2<f64>] {
        &self.similarities
    }

    /// `LinkVector[t]`.
    pub fn link(&self, t: usize) -> Option<&LinkVector> {
        self.links.get(t)
    }

    /// `SimilarityMatrix[t]`.
    pub fn similarity(&self, t: usize) -> Option<&Array2<f64>> {
        self.similarities.get(t)
    }

    /// Accepted `(leaf at t, leaf at t+1)` pairs.
    pub fn matched_pairs(&self, t: usize) -> Vec<(usize, usize)> {
        self.links.get(t).map_or_else(Vec::new, |links| {
            links
                .iter()
                .enumerate()
                .filter_map(|(i, &j)| j.map(|j| (i, j)))
                .collect()
        })
    }

    /// For each leaf at frame `t`, the leaf at `t-1` that continues into it.
    ///
    /// Returns `None` for `t == 0` or past the end of the table.
    pub fn incoming(&self, t: usize) -> Option<Vec<Option<usize>>> {
        let pair = t.checked_sub(1)?;
        let num_targets = self.similarities.get(pair)?.ncols();
        let mut sources = vec![None; num_targets];
        for (i, j) in self.matched_pairs(pair) {
            sources[j] = Some(i);
        }
        Some(sources)
    }
}

/// Overlap plus assignment for the pair `(t, t+1)`.
fn link_pair(
    frames: &FrameSequence,
    t: usize,
    config: &LinkerConfig,
) -> Result<(Array2<f64>, LinkVector)> {
    let (current, next) = (frames.frame(t)?, frames.frame(t + 1)?);
    let weights = overlap::compute_overlaps(current.masks(), next.masks(), config.overlap)?;
    let links = assignment::solve_links(
        &weights,
        &current.available().to_vec(),
        &next.available().to_vec(),
        config.threshold,
    )?;

    debug!(
        frame = t,
        leaves = current.num_leaves(),
        next_leaves = next.num_leaves(),
        matched = links.iter().flatten().count(),
        "linked frame pair"
    );
    Ok((weights, links))
}
