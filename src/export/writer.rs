//! EPUB container serialization.

use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use tempfile::Builder;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::package::OutputPackage;

/// Name of the first container member.
pub const MIMETYPE_PATH: &str = "mimetype";
/// Content of the `mimetype` member.
pub const MIMETYPE: &[u8] = b"application/epub+zip";

/// Configuration for [`EpubWriter`].
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<i64>,
}

/// Serializes an [`OutputPackage`] into an EPUB container.
///
/// `mimetype` is always the first member and always stored uncompressed,
/// as EPUB readers expect. Every other member is deflated, in the order
/// given by [`OutputPackage::members`].
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use quire::{BuildContext, Chapter, EpubWriter, PackageBuilder, fixed_batches};
///
/// let chapters = vec![Chapter::new("a.xhtml", "<p>A</p>", "a")];
/// let batches = fixed_batches(&chapters, 10)?;
/// let package = PackageBuilder::new(BuildContext::new("saga")).build(batches[0], 1);
///
/// let mut out = Cursor::new(Vec::new());
/// EpubWriter::new().write(&package, &mut out)?;
/// assert_eq!(&out.get_ref()[30..38], b"mimetype");
/// # Ok::<(), quire::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubWriter {
    config: WriterConfig,
}

impl EpubWriter {
    /// Create a writer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the writer with custom settings.
    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Write the package to `path`, replacing any existing file.
    ///
    /// The container is assembled in a temporary file next to `path` and
    /// renamed into place once complete. On failure `path` is untouched and
    /// the temporary file is removed.
    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        package: &OutputPackage<'_>,
        path: P,
    ) -> io::Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut staged = Builder::new()
            .prefix(".quire-")
            .suffix(".part")
            .tempfile_in(dir)?;
        {
            let mut file = BufWriter::new(staged.as_file_mut());
            self.write(package, &mut file)?;
            file.flush()?;
        }
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Write the package to any [`Write`] + [`Seek`] destination.
    pub fn write<W: Write + Seek>(
        &self,
        package: &OutputPackage<'_>,
        writer: &mut W,
    ) -> io::Result<()> {
        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level));

        zip.start_file(MIMETYPE_PATH, stored).map_err(io_error)?;
        zip.write_all(MIMETYPE)?;

        for member in package.members() {
            if member.name == MIMETYPE_PATH {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "package member collides with the mimetype entry",
                ));
            }
            zip.start_file(member.name, deflated).map_err(io_error)?;
            zip.write_all(member.data)?;
        }

        zip.finish().map_err(io_error)?;
        Ok(())
    }
}

/// Convert zip error to io error.
fn io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::other(e)
}
