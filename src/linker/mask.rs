//! Binary leaf masks and the read-only frame collection they live in.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::error::{LinkError, Result};
use crate::linker::rect::Rect;

/// Score above which a soft segmentation value counts as foreground.
pub const SCORE_CUTOFF: f32 = 0.5;

/// One segmented leaf instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    data: Array2<bool>,
    area: usize,
}

impl Mask {
    pub fn new(data: Array2<bool>) -> Self {
        let area = data.iter().filter(|&&v| v).count();
        Self { data, area }
    }

    /// Empty mask of the given `(height, width)`.
    pub fn empty(dim: (usize, usize)) -> Self {
        Self {
            data: Array2::from_elem(dim, false),
            area: 0,
        }
    }

    /// Build a mask from 0/1 pixel values. Any other value is rejected.
    pub fn from_u8(data: Array2<u8>) -> Result<Self> {
        Self::from_u8_view(data.view())
    }

    fn from_u8_view(data: ArrayView2<'_, u8>) -> Result<Self> {
        if let Some(&value) = data.iter().find(|&&v| v > 1) {
            return Err(LinkError::NonBinaryMask { value });
        }
        Ok(Self::new(data.mapv(|v| v == 1)))
    }

    /// Binarize a soft score map (`score > 0.5` is foreground).
    pub fn from_scores(scores: &Array2<f32>) -> Self {
        Self::new(scores.mapv(|s| s > SCORE_CUTOFF))
    }

    /// Split a `[height, width, instances]` stack into one mask per instance.
    pub fn stack_from_array3(stack: &Array3<u8>) -> Result<Vec<Self>> {
        stack
            .axis_iter(Axis(2))
            .map(Self::from_u8_view)
            .collect()
    }

    /// `(height, width)` of the mask.
    #[inline]
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of foreground pixels.
    #[inline]
    pub fn area(&self) -> usize {
        self.area
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area == 0
    }

    pub fn data(&self) -> &Array2<bool> {
        &self.data
    }

    /// Number of pixels set in both masks. Shapes must already agree.
    pub(crate) fn intersection(&self, other: &Mask) -> usize {
        self.data
            .iter()
            .zip(other.data.iter())
            .filter(|&(&a, &b)| a && b)
            .count()
    }

    /// Tight bounding box of the foreground, `None` for an empty mask.
    pub fn bounding_box(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let (mut top, mut left) = (usize::MAX, usize::MAX);
        let (mut bottom, mut right) = (0, 0);
        for ((r, c), &set) in self.data.indexed_iter() {
            if set {
                top = top.min(r);
                left = left.min(c);
                bottom = bottom.max(r + 1);
                right = right.max(c + 1);
            }
        }
        Some(Rect::from_tlbr(top, left, bottom, right))
    }
}

/// Leaf indices of a frame that take part in matching.
///
/// Starts as the full index range; individual leaves can be excluded
/// before linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableLeaves {
    eligible: Vec<bool>,
}

impl AvailableLeaves {
    pub fn all(count: usize) -> Self {
        Self {
            eligible: vec![true; count],
        }
    }

    #[inline]
    pub fn contains(&self, leaf: usize) -> bool {
        self.eligible.get(leaf).copied().unwrap_or(false)
    }

    /// Eligible leaf indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.eligible
            .iter()
            .enumerate()
            .filter_map(|(i, &e)| e.then_some(i))
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.eligible.iter().filter(|&&e| e).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn exclude(&mut self, leaf: usize) {
        self.eligible[leaf] = false;
    }
}

/// Leaf masks observed at one time point.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    masks: Vec<Mask>,
    available: AvailableLeaves,
}

impl Frame {
    pub fn new(masks: Vec<Mask>) -> Self {
        let available = AvailableLeaves::all(masks.len());
        Self { masks, available }
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn num_leaves(&self) -> usize {
        self.masks.len()
    }

    pub fn available(&self) -> &AvailableLeaves {
        &self.available
    }
}

impl From<Vec<Mask>> for Frame {
    fn from(masks: Vec<Mask>) -> Self {
        Self::new(masks)
    }
}

/// Time-ordered frames sharing one spatial size.
///
/// Validated once at construction; linking only ever borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    dim: Option<(usize, usize)>,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(LinkError::EmptySequence);
        }

        let mut dim: Option<(usize, usize)> = None;
        for (t, frame) in frames.iter().enumerate() {
            for (leaf, mask) in frame.masks.iter().enumerate() {
                match dim {
                    None => dim = Some(mask.dim()),
                    Some(expected) if expected != mask.dim() => {
                        return Err(LinkError::DimensionMismatch {
                            frame: t,
                            leaf,
                            expected,
                            got: mask.dim(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self { frames, dim })
    }

    pub fn from_masks(masks: Vec<Vec<Mask>>) -> Result<Self> {
        Self::new(masks.into_iter().map(Frame::new).collect())
    }

    /// Remove a leaf from matching. It will neither link nor receive an identity.
    pub fn exclude_leaf(mut self, frame: usize, leaf: usize) -> Result<Self> {
        let len = self.frames.len();
        let target = self
            .frames
            .get_mut(frame)
            .ok_or(LinkError::FrameOutOfRange { frame, len })?;
        if leaf >= target.num_leaves() {
            return Err(LinkError::LeafOutOfRange {
                frame,
                leaf,
                count: target.num_leaves(),
            });
        }
        target.available.exclude(leaf);
        Ok(self)
    }

    /// Number of frames `T`.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shared `(height, width)`; `None` when no frame holds a mask.
    pub fn dim(&self) -> Option<(usize, usize)> {
        self.dim
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, t: usize) -> Result<&Frame> {
        self.frames.get(t).ok_or(LinkError::FrameOutOfRange {
            frame: t,
            len: self.frames.len(),
        })
    }

    pub fn num_leaves(&self) -> Vec<usize> {
        self.frames.iter().map(Frame::num_leaves).collect()
    }

    pub fn initial_leaves(&self) -> usize {
        self.frames[0].num_leaves()
    }

    pub fn max_leaves(&self) -> usize {
        self.frames.iter().map(Frame::num_leaves).max().unwrap_or(0)
    }

    /// Leaf count at frame 0 followed by the change in count at each later frame.
    pub fn leaf_count_deltas(&self) -> Vec<i64> {
        let counts: Vec<i64> = self.num_leaves().into_iter().map(|n| n as i64).collect();
        std::iter::once(counts[0])
            .chain(counts.windows(2).map(|w| w[1] - w[0]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_u8_rejects_non_binary() {
        let data = array![[0u8, 1], [2, 0]];
        assert_eq!(
            Mask::from_u8(data),
            Err(LinkError::NonBinaryMask { value: 2 })
        );
    }

    #[test]
    fn test_from_scores_binarizes_above_half() {
        let scores = array![[0.2f32, 0.5], [0.51, 0.9]];
        let mask = Mask::from_scores(&scores);
        assert_eq!(mask.area(), 2);
        assert!(!mask.data()[[0, 1]]);
        assert!(mask.data()[[1, 0]]);
    }

    #[test]
    fn test_stack_from_array3() {
        let mut stack = Array3::<u8>::zeros((4, 4, 3));
        stack[[0, 0, 0]] = 1;
        stack[[1, 1, 1]] = 1;
        stack[[2, 2, 1]] = 1;
        let masks = Mask::stack_from_array3(&stack).unwrap();
        assert_eq!(masks.len(), 3);
        assert_eq!(masks[0].area(), 1);
        assert_eq!(masks[1].area(), 2);
        assert!(masks[2].is_empty());
        assert_eq!(masks[1].dim(), (4, 4));
    }

    #[test]
    fn test_bounding_box() {
        let mut data = Array2::from_elem((6, 6), false);
        data[[1, 2]] = true;
        data[[3, 4]] = true;
        let mask = Mask::new(data);
        assert_eq!(mask.bounding_box(), Some(Rect::from_tlbr(1, 2, 4, 5)));
        assert_eq!(Mask::empty((6, 6)).bounding_box(), None);
    }

    #[test]
    fn test_sequence_rejects_empty() {
        assert_eq!(FrameSequence::new(vec![]), Err(LinkError::EmptySequence));
    }

    #[test]
    fn test_sequence_rejects_dimension_mismatch() {
        let result = FrameSequence::from_masks(vec![
            vec![Mask::empty((4, 4))],
            vec![],
            vec![Mask::empty((4, 4)), Mask::empty((4, 5))],
        ]);
        assert_eq!(
            result,
            Err(LinkError::DimensionMismatch {
                frame: 2,
                leaf: 1,
                expected: (4, 4),
                got: (4, 5),
            })
        );
    }

    #[test]
    fn test_exclude_leaf() {
        let seq = FrameSequence::from_masks(vec![vec![Mask::empty((2, 2)); 3]])
            .unwrap()
            .exclude_leaf(0, 1)
            .unwrap();
        assert_eq!(seq.frames()[0].available().to_vec(), vec![0, 2]);
        assert_eq!(seq.frames()[0].available().len(), 2);

        let err = seq.clone().exclude_leaf(0, 3).unwrap_err();
        assert!(matches!(err, LinkError::LeafOutOfRange { leaf: 3, .. }));
        let err = seq.exclude_leaf(4, 0).unwrap_err();
        assert_eq!(err, LinkError::FrameOutOfRange { frame: 4, len: 1 });
    }

    #[test]
    fn test_leaf_count_summaries() {
        let seq = FrameSequence::from_masks(vec![
            vec![Mask::empty((2, 2)); 2],
            vec![Mask::empty((2, 2)); 4],
            vec![Mask::empty((2, 2)); 3],
        ])
        .unwrap();
        assert_eq!(seq.num_leaves(), vec![2, 4, 3]);
        assert_eq!(seq.initial_leaves(), 2);
        assert_eq!(seq.max_leaves(), 4);
        assert_eq!(seq.leaf_count_deltas(), vec![2, 2, -1]);
        assert_eq!(seq.dim(), Some((2, 2)));
    }
}
