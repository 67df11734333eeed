//! Building and writing the output EPUBs.
//!
//! [`PackageBuilder`] turns a [`Batch`](crate::Batch) into an
//! [`OutputPackage`]: every generated document plus the ordered list of
//! container members. [`EpubWriter`] serializes that package.
//!
//! # Example
//!
//! ```no_run
//! use quire::{BuildContext, Chapter, EpubWriter, PackageBuilder, fixed_batches};
//!
//! let chapters = vec![Chapter::new("001-arrival.xhtml", "<p>...</p>", "arrival")];
//! let builder = PackageBuilder::new(BuildContext::new("saga"));
//!
//! for (i, batch) in fixed_batches(&chapters, 100)?.into_iter().enumerate() {
//!     let package = builder.build(batch, i + 1);
//!     EpubWriter::new().write_to_path(&package, &package.file_name)?;
//! }
//! # Ok::<(), quire::Error>(())
//! ```

mod check;
mod package;
mod writer;

pub use check::is_well_formed;
pub use package::{
    BuildContext, CONTAINER_PATH, CONTAINER_XML, ChapterDocument, ManifestItem, Member, NCX_PATH,
    NavPoint, OPF_PATH, OutputPackage, PackageBuilder, STYLESHEET, STYLESHEET_PATH,
    chapter_document,
};
pub use writer::{EpubWriter, MIMETYPE, MIMETYPE_PATH, WriterConfig};
