//! Rank and shape reconciliation between on-disk columns and in-memory targets.
//!
//! On-disk extents (`naxes`) are listed fastest axis first. For text columns the first
//! axis is the string width. Reconciled shapes are row-major and never include the width.

use crate::option::ReadOptions;

/// Shape class of an in-memory target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    /// One numeric or logical element.
    Scalar,
    /// Numeric or logical array of the given rank.
    Array(usize),
    /// One string.
    Text,
    /// Array of strings of the given rank.
    TextArray(usize),
}

impl TargetShape {
    /// Rank the target expects on disk. Strings count their width as an extra axis.
    pub fn rank(self) -> usize {
        match self {
            TargetShape::Scalar | TargetShape::Text => 1,
            TargetShape::Array(rank) => rank,
            TargetShape::TextArray(rank) => rank + 1,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, TargetShape::Text | TargetShape::TextArray(_))
    }
}

fn rank_admitted(naxis: usize, expected: usize, declared: usize, opts: &ReadOptions) -> bool {
    if naxis < expected {
        return opts.allow_dim_promote;
    }
    if naxis > expected {
        return declared == 1 && opts.allow_flatten;
    }
    true
}

/// Whether on-disk data with extents `naxes` may populate a target of shape `shape`.
pub fn admits(shape: TargetShape, naxes: &[usize], opts: &ReadOptions) -> bool {
    let naxis = naxes.len();
    match shape {
        // Array data never collapses into a scalar, whatever the policy.
        TargetShape::Scalar => {
            naxes.iter().product::<usize>() <= 1 && rank_admitted(naxis, 1, 1, opts)
        }
        TargetShape::Array(rank) => rank_admitted(naxis, rank, rank, opts),
        TargetShape::Text => {
            naxes.iter().skip(1).product::<usize>() <= 1 && rank_admitted(naxis, 1, 1, opts)
        }
        // A lone width axis is a single string, which any rank-1 string array holds.
        TargetShape::TextArray(1) if naxis == 1 => true,
        TargetShape::TextArray(rank) => rank_admitted(naxis, rank + 1, rank, opts),
    }
}

/// Row-major shape an admitted target takes. Missing leading extents are 1; extra
/// extents collapse into their product.
pub fn reconciled_shape(shape: TargetShape, naxes: &[usize]) -> Vec<usize> {
    let (rank, axes) = match shape {
        TargetShape::Scalar | TargetShape::Text => return Vec::new(),
        TargetShape::Array(rank) => (rank, naxes),
        TargetShape::TextArray(rank) => (rank, naxes.get(1..).unwrap_or_default()),
    };
    if axes.len() > rank {
        return vec![axes.iter().product()];
    }
    let pad = rank - axes.len();
    (0..rank)
        .map(|i| if i < pad { 1 } else { axes[rank - 1 - i] })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_rank_is_accepted() {
        assert!(admits(TargetShape::Array(2), &[3, 4], &ReadOptions::STRICT));
        assert_eq!(reconciled_shape(TargetShape::Array(2), &[3, 4]), vec![4, 3]);
    }

    #[test]
    fn promotion_pads_leading_extents() {
        let naxes = [5];
        assert!(!admits(TargetShape::Array(3), &naxes, &ReadOptions::STRICT));
        assert!(admits(TargetShape::Array(3), &naxes, &ReadOptions::DIM_PROMOTE));
        assert_eq!(reconciled_shape(TargetShape::Array(3), &naxes), vec![1, 1, 5]);
    }

    #[test]
    fn flattening_needs_rank_one_target() {
        let naxes = [2, 3, 4];
        assert!(!admits(TargetShape::Array(1), &naxes, &ReadOptions::STRICT));
        assert!(admits(TargetShape::Array(1), &naxes, &ReadOptions::FLATTEN));
        assert!(!admits(TargetShape::Array(2), &naxes, &ReadOptions::FLATTEN));
        assert_eq!(reconciled_shape(TargetShape::Array(1), &naxes), vec![24]);
    }

    #[test]
    fn scalars_refuse_arrays() {
        assert!(admits(TargetShape::Scalar, &[1], &ReadOptions::STRICT));
        assert!(!admits(TargetShape::Scalar, &[3], &ReadOptions::PERMISSIVE));
        assert!(!admits(TargetShape::Scalar, &[1, 1], &ReadOptions::STRICT));
        assert!(admits(TargetShape::Scalar, &[1, 1], &ReadOptions::FLATTEN));
        assert!(!admits(TargetShape::Scalar, &[2, 3], &ReadOptions::PERMISSIVE));
    }

    #[test]
    fn strings_count_their_width() {
        assert!(admits(TargetShape::Text, &[8], &ReadOptions::STRICT));
        assert!(!admits(TargetShape::Text, &[8, 3], &ReadOptions::PERMISSIVE));

        assert!(admits(TargetShape::TextArray(1), &[8], &ReadOptions::STRICT));
        assert_eq!(reconciled_shape(TargetShape::TextArray(1), &[8]), vec![1]);

        assert!(admits(TargetShape::TextArray(1), &[8, 3], &ReadOptions::STRICT));
        assert_eq!(reconciled_shape(TargetShape::TextArray(1), &[8, 3]), vec![3]);

        assert!(!admits(TargetShape::TextArray(2), &[8, 3], &ReadOptions::STRICT));
        assert!(admits(TargetShape::TextArray(2), &[8, 3], &ReadOptions::DIM_PROMOTE));
        assert_eq!(reconciled_shape(TargetShape::TextArray(2), &[8, 3]), vec![1, 3]);

        assert!(admits(TargetShape::TextArray(1), &[8, 3, 2], &ReadOptions::FLATTEN));
        assert_eq!(reconciled_shape(TargetShape::TextArray(1), &[8, 3, 2]), vec![6]);
    }
}
