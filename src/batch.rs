//! Partitioning the chapter sequence into output batches.

use crate::config::Partition;
use crate::error::{Error, Result};
use crate::model::Chapter;

/// A contiguous run of chapters destined for one output file.
///
/// `start` and `end` are the declared 1-based positions in the source
/// sequence. They name the part (`saga 101-200`) and are not recomputed
/// from `chapters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub start: usize,
    pub end: usize,
    pub chapters: &'a [Chapter],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Split `chapters` into consecutive windows of `size`.
///
/// The last window may be shorter. An empty book yields no batches.
pub fn fixed_batches(chapters: &[Chapter], size: usize) -> Result<Vec<Batch<'_>>> {
    if size == 0 {
        return Err(Error::Config("batch size must be at least 1".into()));
    }

    Ok(chapters
        .chunks(size)
        .enumerate()
        .map(|(i, window)| {
            let start = i * size + 1;
            Batch {
                start,
                end: start + window.len() - 1,
                chapters: window,
            }
        })
        .collect())
}

/// Select chapters `start..=end` (1-based, inclusive) as a single batch.
pub fn single_range(chapters: &[Chapter], start: usize, end: usize) -> Result<Batch<'_>> {
    if start < 1 || end > chapters.len() || start > end {
        return Err(Error::Range {
            start,
            end,
            total: chapters.len(),
        });
    }

    Ok(Batch {
        start,
        end,
        chapters: &chapters[start - 1..end],
    })
}

/// Apply a [`Partition`] to the chapter sequence.
pub fn partition(chapters: &[Chapter], partition: Partition) -> Result<Vec<Batch<'_>>> {
    match partition {
        Partition::Fixed { size } => fixed_batches(chapters, size),
        Partition::Range { start, end } => Ok(vec![single_range(chapters, start, end)?]),
    }
}
