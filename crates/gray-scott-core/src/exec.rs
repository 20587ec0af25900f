use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How row passes over a field are scheduled.
///
/// Every output cell depends only on the previous step's fields, so both
/// modes produce bit-identical results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

/// Apply `f` to each `width`-long row of `data`, collecting the per-row results
/// in row order.
pub(crate) fn map_rows<R, F>(mode: ExecutionMode, data: &mut [f32], width: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize, &mut [f32]) -> R + Sync + Send,
{
    match mode {
        ExecutionMode::Sequential => data
            .chunks_mut(width)
            .enumerate()
            .map(|(y, row)| f(y, row))
            .collect(),
        ExecutionMode::Parallel => data
            .par_chunks_mut(width)
            .enumerate()
            .map(|(y, row)| f(y, row))
            .collect(),
    }
}

/// Like [`map_rows`], but walks two same-shaped buffers in lockstep.
pub(crate) fn map_row_pairs<R, F>(
    mode: ExecutionMode,
    left: &mut [f32],
    right: &mut [f32],
    width: usize,
    f: F,
) -> Vec<R>
where
    R: Send,
    F: Fn(usize, &mut [f32], &mut [f32]) -> R + Sync + Send,
{
    debug_assert_eq!(left.len(), right.len());
    match mode {
        ExecutionMode::Sequential => left
            .chunks_mut(width)
            .zip(right.chunks_mut(width))
            .enumerate()
            .map(|(y, (l, r))| f(y, l, r))
            .collect(),
        ExecutionMode::Parallel => left
            .par_chunks_mut(width)
            .zip(right.par_chunks_mut(width))
            .enumerate()
            .map(|(y, (l, r))| f(y, l, r))
            .collect(),
    }
}
