//! The split pipeline: read once, partition, then build and write each part.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::batch::{Batch, partition};
use crate::config::{CollisionPolicy, SplitConfig};
use crate::error::{Error, Result};
use crate::export::{BuildContext, EpubWriter, PackageBuilder, WriterConfig};
use crate::import::SourceArchive;

/// One output file written by [`split_epub`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct WrittenPart {
    pub index: usize,
    pub path: PathBuf,
    pub title: String,
    pub identifier: String,
    /// Declared first chapter position (1-based).
    pub start: usize,
    /// Declared last chapter position (1-based).
    pub end: usize,
    pub chapter_count: usize,
}

/// Summary of a completed split.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SplitReport {
    pub base_name: String,
    pub output_dir: PathBuf,
    /// Chapters found in the source.
    pub chapter_count: usize,
    /// Member name of the cover, if one was found.
    pub cover: Option<String>,
    pub parts: Vec<WrittenPart>,
}

/// Split the configured EPUB into parts.
///
/// The whole source is read before anything is written. A configuration,
/// range or collision problem therefore fails the run with no output. Each
/// part appears on disk only once fully written. If the first part fails the
/// error is [`Error::Io`]; a later failure is [`Error::Batch`], listing the
/// parts already on disk, which are left in place.
///
/// # Example
///
/// ```no_run
/// use quire::{SplitConfig, split_epub};
///
/// let config = SplitConfig::new("books/saga.epub", "books/").with_batch_size(50);
/// let report = split_epub(&config)?;
/// for part in &report.parts {
///     println!("{} ({} chapters)", part.path.display(), part.chapter_count);
/// }
/// # Ok::<(), quire::Error>(())
/// ```
pub fn split_epub(config: &SplitConfig) -> Result<SplitReport> {
    config.validate()?;

    let base_name = config.base_name();
    info!(base_name = %base_name, output_dir = %config.output_dir.display(), "splitting book");

    let book = SourceArchive::open(&config.source)?.read_book()?;
    info!(chapters = book.chapters.len(), "found chapters");

    let batches = partition(&book.chapters, config.partition)?;

    let context = BuildContext::new(base_name.clone())
        .with_title(config.explicit_title().map(str::to_string))
        .with_cover(book.cover.as_ref());
    let builder = PackageBuilder::new(context);
    check_collisions(&builder, &batches, config.collisions)?;

    info!(parts = batches.len(), "writing parts");
    let writer = EpubWriter::new().with_config(WriterConfig {
        compression_level: config.compression_level,
    });

    let mut parts: Vec<WrittenPart> = Vec::with_capacity(batches.len());
    for (i, batch) in batches.into_iter().enumerate() {
        let index = i + 1;
        let package = builder.build(batch, index);

        for document in package.malformed_documents() {
            warn!(
                part = index,
                document, "generated document is not well-formed XML"
            );
        }

        let path = config.output_dir.join(&package.file_name);
        info!(path = %path.display(), title = %package.title, "writing part");

        if let Err(e) = writer.write_to_path(&package, &path) {
            if parts.is_empty() {
                return Err(e.into());
            }
            return Err(Error::Batch {
                index,
                written: parts.into_iter().map(|p| p.path).collect(),
                source: Box::new(e.into()),
            });
        }

        info!(path = %path.display(), chapters = batch.len(), "wrote part");
        parts.push(WrittenPart {
            index,
            path,
            title: package.title.clone(),
            identifier: package.identifier.clone(),
            start: batch.start,
            end: batch.end,
            chapter_count: batch.len(),
        });
    }

    Ok(SplitReport {
        base_name,
        output_dir: config.output_dir.clone(),
        chapter_count: book.chapters.len(),
        cover: book.cover.as_ref().map(|c| c.name.clone()),
        parts,
    })
}

/// Fail (or warn, under [`CollisionPolicy::Overwrite`]) when two batches
/// map to the same output file name.
fn check_collisions(
    builder: &PackageBuilder<'_>,
    batches: &[Batch<'_>],
    policy: CollisionPolicy,
) -> Result<()> {
    if !builder.naming().is_constant() || batches.len() < 2 {
        return Ok(());
    }

    let mut by_name: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, batch) in batches.iter().enumerate() {
        by_name
            .entry(builder.file_name(batch))
            .or_default()
            .push(i + 1);
    }

    for (file_name, indices) in by_name {
        if indices.len() < 2 {
            continue;
        }
        match policy {
            CollisionPolicy::Reject => {
                return Err(Error::Collision {
                    file_name,
                    batches: indices,
                });
            }
            CollisionPolicy::Overwrite => {
                warn!(
                    file_name = %file_name,
                    batches = ?indices,
                    "several parts share one file name; only the last one will remain"
                );
            }
        }
    }

    Ok(())
}
