//! Reading chapters and the cover out of a source EPUB.
//!
//! The import side runs once per split and buffers everything it needs in
//! memory: each chapter's body fragment and the cover bytes. Batching and
//! export never touch the source archive again.

mod archive;
mod fragment;

pub use archive::SourceArchive;
pub use fragment::{FragmentExtractor, LenientExtractor, decode_text};
