//! Split configuration.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Chapters per output file when no size is given.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// How the chapter sequence is partitioned into output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Consecutive windows of `size` chapters covering the whole book.
    Fixed { size: usize },
    /// A single output holding chapters `start..=end` (1-based).
    Range { start: usize, end: usize },
}

impl Default for Partition {
    fn default() -> Self {
        Partition::Fixed {
            size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// What to do when several batches map to the same output file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Fail before anything is written.
    #[default]
    Reject,
    /// Write every batch; later batches replace earlier ones on disk.
    Overwrite,
}

/// How output files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `{base}_{start}_{end}.epub`
    Positional,
    /// The explicit title with whitespace runs collapsed to `_`.
    Titled(String),
}

impl NamingPolicy {
    /// Output file name for a batch covering `start..=end`.
    pub fn file_name(&self, base_name: &str, start: usize, end: usize) -> String {
        match self {
            NamingPolicy::Positional => format!("{base_name}_{start}_{end}.epub"),
            NamingPolicy::Titled(title) => {
                let safe: Vec<&str> = title.split_whitespace().collect();
                format!("{}.epub", safe.join("_"))
            }
        }
    }

    /// Whether every batch gets the same file name.
    pub fn is_constant(&self) -> bool {
        matches!(self, NamingPolicy::Titled(_))
    }
}

/// Everything a split run needs, validated once up front.
///
/// # Example
///
/// ```
/// use quire::{Partition, SplitConfig};
///
/// let config = SplitConfig::new("books/saga.epub", "out/")
///     .with_batch_size(50)
///     .with_title("The Saga");
/// assert_eq!(config.partition, Partition::Fixed { size: 50 });
/// assert_eq!(config.base_name(), "saga");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Source EPUB.
    pub source: PathBuf,
    /// Existing directory the parts are written to.
    pub output_dir: PathBuf,
    pub partition: Partition,
    /// Explicit display title for every part.
    pub title: Option<String>,
    pub collisions: CollisionPolicy,
    /// Deflate level for members other than `mimetype` (default 6).
    pub compression_level: Option<i64>,
}

impl SplitConfig {
    /// Create a configuration splitting into [`DEFAULT_BATCH_SIZE`] chapters.
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
            partition: Partition::default(),
            title: None,
            collisions: CollisionPolicy::default(),
            compression_level: None,
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.partition = Partition::Fixed { size };
        self
    }

    /// Produce a single part with chapters `start..=end` instead of batching.
    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.partition = Partition::Range { start, end };
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Check everything that can be checked without reading the source.
    ///
    /// Range bounds need the chapter count and are checked once the book
    /// has been read.
    pub fn validate(&self) -> Result<()> {
        if self.partition == (Partition::Fixed { size: 0 }) {
            return Err(Error::Config("batch size must be at least 1".into()));
        }

        if let Some(title) = self.explicit_title()
            && title.trim().is_empty()
        {
            return Err(Error::Config("title must not be blank".into()));
        }

        if let Some(level) = self.compression_level
            && !(0..=9).contains(&level)
        {
            return Err(Error::Config(format!(
                "compression level {level} is outside 0-9"
            )));
        }

        Ok(())
    }

    /// The explicit title, if one was given. An empty title counts as none.
    pub fn explicit_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Name of the book used in default titles and file names.
    pub fn base_name(&self) -> String {
        base_name(&self.source.to_string_lossy()).to_string()
    }
}

/// File name of `path` without directories and without a `.epub` extension.
///
/// Both `/` and `\` count as separators.
pub fn base_name(path: &str) -> &str {
    let stem = match path.len().checked_sub(5) {
        Some(cut) if path.is_char_boundary(cut) && path[cut..].eq_ignore_ascii_case(".epub") => {
            &path[..cut]
        }
        _ => path,
    };
    stem.rsplit(['/', '\\']).next().unwrap_or(stem)
}

/// Directory portion of `path`, including the trailing separator, or `./`.
pub fn default_output_dir(path: &str) -> PathBuf {
    match path.rfind(['/', '\\']) {
        Some(i) => PathBuf::from(&path[..=i]),
        None => PathBuf::from("./"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("books/My Book.epub"), "My Book");
        assert_eq!(base_name("C:\\books\\saga.EPUB"), "saga");
        assert_eq!(base_name("saga"), "saga");
        assert_eq!(base_name("dir/archive.zip"), "archive.zip");
        assert_eq!(base_name(".epub"), "");
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(default_output_dir("books/saga.epub"), PathBuf::from("books/"));
        assert_eq!(default_output_dir("C:\\b\\saga.epub"), PathBuf::from("C:\\b\\"));
        assert_eq!(default_output_dir("saga.epub"), PathBuf::from("./"));
    }

    #[test]
    fn test_defaults() {
        let config = SplitConfig::new("a.epub", "out");
        assert_eq!(config.partition, Partition::Fixed { size: 100 });
        assert_eq!(config.collisions, CollisionPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_batch_size() {
        let config = SplitConfig::new("a.epub", "out").with_batch_size(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_range_replaces_batch_size() {
        let config = SplitConfig::new("a.epub", "out")
            .with_batch_size(10)
            .with_range(2, 4);
        assert_eq!(config.partition, Partition::Range { start: 2, end: 4 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_title_and_compression() {
        let blank = SplitConfig::new("a.epub", "out").with_title("  ");
        assert!(matches!(blank.validate(), Err(Error::Config(_))));

        let level = SplitConfig::new("a.epub", "out").with_compression_level(12);
        assert!(matches!(level.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_title_counts_as_absent() {
        let config = SplitConfig::new("a.epub", "out").with_title("");
        assert_eq!(config.explicit_title(), None);
        assert!(config.validate().is_ok());

        let config = SplitConfig::new("a.epub", "out").with_title("Saga");
        assert_eq!(config.explicit_title(), Some("Saga"));
    }

    #[test]
    fn test_naming_policy() {
        assert_eq!(
            NamingPolicy::Positional.file_name("saga", 101, 200),
            "saga_101_200.epub"
        );
        let titled = NamingPolicy::Titled("  The   Long\tSaga ".into());
        assert_eq!(titled.file_name("saga", 1, 100), "The_Long_Saga.epub");
        assert_eq!(titled.file_name("saga", 101, 200), "The_Long_Saga.epub");
        assert!(titled.is_constant());
        assert!(!NamingPolicy::Positional.is_constant());
    }
}
