//! Error types for quire operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while splitting a book.
#[derive(Error, Debug)]
pub enum Error {
    /// The source file is missing, unreadable, or not a ZIP container.
    #[error("cannot read source archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid range: {start}-{end}, total chapters: {total}")]
    Range {
        start: usize,
        end: usize,
        total: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Several batches would be written to the same output file.
    #[error("batches {batches:?} would all be written to {file_name}")]
    Collision {
        file_name: String,
        batches: Vec<usize>,
    },

    /// A batch failed after `written` had already been put on disk.
    #[error("batch {index} failed after {} file(s) were written: {source}", written.len())]
    Batch {
        index: usize,
        written: Vec<PathBuf>,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
