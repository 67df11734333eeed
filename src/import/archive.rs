use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use super::fragment::{FragmentExtractor, LenientExtractor, decode_text};
use crate::error::Result;
use crate::model::{Chapter, CoverAsset, MediaType, SourceBook};
use crate::title::derive_title;

/// A source EPUB opened for chapter extraction.
///
/// Only the ZIP directory is consulted: chapters are the `.html`/`.xhtml`
/// members in ascending name order, regardless of any spine the package
/// document declares.
pub struct SourceArchive<R> {
    archive: ZipArchive<R>,
    /// Member names in central directory order.
    names: Vec<String>,
    extractor: Box<dyn FragmentExtractor>,
}

impl SourceArchive<BufReader<File>> {
    /// Open an EPUB file on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ZipError::from)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> SourceArchive<R> {
    /// Open an EPUB from any [`Read`] + [`Seek`] source.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let mut names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            names.push(file.name().to_string());
        }

        Ok(Self {
            archive,
            names,
            extractor: Box::new(LenientExtractor),
        })
    }

    /// Replace the fragment extractor used for chapter bodies.
    pub fn with_extractor(mut self, extractor: impl FragmentExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// All member names in the order the archive lists them.
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    /// Chapter member names, sorted ascending.
    pub fn chapter_entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .filter(|name| is_chapter_entry(name))
            .collect();
        entries.sort_unstable();
        entries
    }

    /// Read one chapter member and extract its body fragment.
    ///
    /// Malformed markup yields a best-effort fragment; only archive-level
    /// failures are reported as errors.
    pub fn extract_chapter(&mut self, entry: &str) -> Result<Chapter> {
        let data = self.read_entry(entry)?;
        let text = decode_text(&data);
        let content = self.extractor.extract(&text).to_string();

        let file_name = base_name(entry);
        let title = derive_title(file_name);
        debug!(entry, title = %title, bytes = data.len(), "extracted chapter");

        Ok(Chapter {
            file_name: file_name.to_string(),
            content,
            title,
        })
    }

    /// Find the cover image: the first member, in listing order, whose
    /// name contains "cover" (any case) and ends in `.jpg`, `.jpeg` or `.png`.
    pub fn locate_cover(&mut self) -> Result<Option<CoverAsset>> {
        let found = self.names.iter().find_map(|name| {
            let lower = name.to_lowercase();
            if !lower.contains("cover") {
                return None;
            }
            MediaType::from_name(name).map(|media_type| (name.clone(), media_type))
        });

        let Some((entry, media_type)) = found else {
            return Ok(None);
        };

        let data = self.read_entry(&entry)?;
        let name = base_name(&entry).to_string();
        info!(cover = %name, media_type = media_type.mime_type(), "found cover image");

        Ok(Some(CoverAsset {
            name,
            data,
            media_type,
        }))
    }

    /// Extract every chapter and the cover into memory.
    pub fn read_book(&mut self) -> Result<SourceBook> {
        let entries: Vec<String> = self
            .chapter_entries()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut seen = HashSet::new();
        let mut chapters = Vec::with_capacity(entries.len());
        for entry in &entries {
            let chapter = self.extract_chapter(entry)?;
            if !seen.insert(chapter.file_name.clone()) {
                warn!(
                    file_name = %chapter.file_name,
                    "several chapters share a file name; output containers will reject the duplicate"
                );
            }
            chapters.push(chapter);
        }

        let cover = self.locate_cover()?;
        info!(chapters = chapters.len(), "read source book");

        Ok(SourceBook { chapters, cover })
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let file = self.archive.by_name(name)?;
        let declared = file.size();
        let data = read_to_vec(file, declared).map_err(ZipError::from)?;
        Ok(data)
    }
}

/// Largest buffer reserved up front from a member's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

/// Read `reader` to the end. `declared` is the size recorded in the archive,
/// which is untrusted and only used as a capped capacity hint.
fn read_to_vec<R: Read>(mut reader: R, declared: u64) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);
    reader.read_to_end(&mut data)?;
    Ok(data)
}

fn is_chapter_entry(name: &str) -> bool {
    name.ends_with(".html") || name.ends_with(".xhtml")
}

/// Last path component of a member name.
fn base_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}
