//! Entry point tying overlap, assignment and trajectory building together.

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};
use crate::linker::link_table::LinkTable;
use crate::linker::mask::FrameSequence;
use crate::linker::overlap::OverlapMode;
use crate::linker::trajectory::LeafSeries;

/// Configuration for the LeafLinker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Minimum similarity for a match to be accepted
    pub threshold: f64,
    pub overlap: OverlapMode,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            overlap: OverlapMode::Iou,
        }
    }
}

impl LinkerConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapMode) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_finite() && (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(LinkError::InvalidThreshold(self.threshold))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeafLinker {
    config: LinkerConfig,
}

impl LeafLinker {
    pub fn new(config: LinkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Build similarity matrices and link vectors for every frame pair.
    pub fn link(&self, frames: &FrameSequence) -> Result<LinkTable> {
        LinkTable::build(frames, &self.config)
    }

    /// Link the sequence, then chain links into per-identity trajectories.
    pub fn track(&self, frames: &FrameSequence) -> Result<(LinkTable, LeafSeries)> {
        let table = self.link(frames)?;
        let series = LeafSeries::build(frames, &table)?;
        Ok((table, series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkerConfig::default();
        assert_eq!(config.threshold, 0.2);
        assert_eq!(config.overlap, OverlapMode::Iou);
        assert!(LeafLinker::new(config).is_ok());
    }

    #[test]
    fn test_invalid_thresholds() {
        for threshold in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = LeafLinker::new(LinkerConfig::default().with_threshold(threshold)).unwrap_err();
            assert!(matches!(err, LinkError::InvalidThreshold(_)));
        }
        assert!(LeafLinker::new(LinkerConfig::default().with_threshold(0.0)).is_ok());
        assert!(LeafLinker::new(LinkerConfig::default().with_threshold(1.0)).is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config: LinkerConfig =
            serde_json::from_str(r#"{"threshold": 0.35, "overlap": "IntersectionOverPrevious"}"#)
                .unwrap();
        assert_eq!(config.threshold, 0.35);
        assert_eq!(config.overlap, OverlapMode::IntersectionOverPrevious);

        let config: LinkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LinkerConfig::default());
    }
}
