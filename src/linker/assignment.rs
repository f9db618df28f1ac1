//! Thresholded one-to-one assignment of leaves between two frames.

use ndarray::Array2;
use tracing::warn;

use crate::error::{LinkError, Result};

/// For each leaf at t, the matched leaf at t+1, or `None` when it has no continuation.
pub type LinkVector = Vec<Option<usize>>;

/// Cost given to padding cells of the square solver matrix.
const PADDING_COST: f64 = 1e6;

/// Columns whose best similarity over `rows` reaches `threshold`.
///
/// Columns below the threshold are dropped before solving so the solver
/// can never pair a row with them, even when nothing better is left.
pub fn filter_columns(
    weights: &Array2<f64>,
    rows: &[usize],
    cols: &[usize],
    threshold: f64,
) -> Vec<usize> {
    cols.iter()
        .copied()
        .filter(|&j| {
            rows.iter()
                .map(|&i| weights[[i, j]])
                .fold(f64::NEG_INFINITY, f64::max)
                >= threshold
        })
        .collect()
}

/// Maximum-weight one-to-one matching of `rows` to `cols` of `weights`.
///
/// Only pairs with similarity `>= threshold` are kept. The returned vector
/// has one entry per row of `weights`; rows outside `rows` stay `None`.
pub fn solve_links(
    weights: &Array2<f64>,
    rows: &[usize],
    cols: &[usize],
    threshold: f64,
) -> Result<LinkVector> {
    let mut links = vec![None; weights.nrows()];
    if rows.is_empty() || cols.is_empty() {
        return Ok(links);
    }

    let candidates = filter_columns(weights, rows, cols, threshold);
    if candidates.is_empty() {
        warn!(
            rows = rows.len(),
            cols = cols.len(),
            threshold,
            "no candidate column reaches the match threshold"
        );
        return Ok(links);
    }

    let row_to_col = assign(weights, rows, &candidates)?;
    for (r, c) in row_to_col.into_iter().enumerate() {
        let Some(c) = c else { continue };
        let (i, j) = (rows[r], candidates[c]);
        if weights[[i, j]] >= threshold {
            links[i] = Some(j);
        }
    }
    Ok(links)
}

/// Run the solver on the `rows x cols` sub-matrix, maximizing total similarity.
///
/// Returns, per position in `rows`, the position in `cols` it was given.
fn assign(weights: &Array2<f64>, rows: &[usize], cols: &[usize]) -> Result<Vec<Option<usize>>> {
    let (num_rows, num_cols) = (rows.len(), cols.len());
    let size = num_rows.max(num_cols);

    if size == 1 {
        return Ok(vec![Some(0)]);
    }

    let mut padded = Array2::<f64>::from_elem((size, size), PADDING_COST);
    for (r, &i) in rows.iter().enumerate() {
        for (c, &j) in cols.iter().enumerate() {
            padded[[r, c]] = 1.0 - weights[[i, j]];
        }
    }

    let (row_to_col, _) =
        lapjv::lapjv(&padded).map_err(|e| LinkError::Solver(format!("{e:?}")))?;

    Ok(row_to_col
        .into_iter()
        .take(num_rows)
        .map(|c| (c < num_cols).then_some(c))
        .collect())
}
