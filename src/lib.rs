//! # quire
//!
//! Split a large EPUB into several smaller, standalone EPUB files.
//!
//! ## Features
//!
//! - Chapters are the `.html`/`.xhtml` members of the source, in name order
//! - Fixed-size parts, or a single part for an explicit chapter range
//! - Each part is a valid EPUB 2 container with its own OPF, NCX and stylesheet
//! - The source cover image, if any, is carried into every part
//!
//! ## Quick Start
//!
//! ```no_run
//! use quire::{SplitConfig, split_epub};
//!
//! // saga.epub -> out/saga_1_100.epub, out/saga_101_200.epub, ...
//! let report = split_epub(&SplitConfig::new("saga.epub", "out/"))?;
//! println!("wrote {} parts", report.parts.len());
//!
//! // Chapters 12 to 40 only, with a custom title.
//! let config = SplitConfig::new("saga.epub", "out/")
//!     .with_range(12, 40)
//!     .with_title("Saga Book Two");
//! split_epub(&config)?;
//! # Ok::<(), quire::Error>(())
//! ```
//!
//! ## Step by Step
//!
//! The pipeline is also available piecewise:
//!
//! ```no_run
//! use quire::{BuildContext, EpubWriter, PackageBuilder, SourceArchive, fixed_batches};
//!
//! let book = SourceArchive::open("saga.epub")?.read_book()?;
//! let context = BuildContext::new("saga").with_cover(book.cover.as_ref());
//! let builder = PackageBuilder::new(context);
//!
//! for (i, batch) in fixed_batches(&book.chapters, 25)?.into_iter().enumerate() {
//!     let package = builder.build(batch, i + 1);
//!     EpubWriter::new().write_to_path(&package, format!("out/{}", package.file_name))?;
//! }
//! # Ok::<(), quire::Error>(())
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod model;
mod split;
mod title;

pub use batch::{Batch, fixed_batches, partition, single_range};
pub use config::{
    CollisionPolicy, DEFAULT_BATCH_SIZE, NamingPolicy, Partition, SplitConfig, base_name,
    default_output_dir,
};
pub use error::{Error, Result};
pub use export::{BuildContext, EpubWriter, OutputPackage, PackageBuilder, WriterConfig};
pub use import::{FragmentExtractor, LenientExtractor, SourceArchive};
pub use model::{Chapter, CoverAsset, MediaType, SourceBook};
pub use split::{SplitReport, WrittenPart, split_epub};
pub use title::derive_title;
