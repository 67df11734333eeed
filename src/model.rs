//! Book content extracted from a source EPUB.

/// A single content document of the source book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Base name of the source entry (e.g. `"012-the-storm.xhtml"`).
    ///
    /// Reused verbatim as the member name, manifest href and TOC target of
    /// the chapter in every output container.
    pub file_name: String,
    /// Inner body markup, without the surrounding document.
    pub content: String,
    /// Display title derived from `file_name`.
    pub title: String,
}

impl Chapter {
    pub fn new(
        file_name: impl Into<String>,
        content: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            title: title.into(),
        }
    }
}

/// Image formats accepted as a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
}

impl MediaType {
    /// Classify an entry name by its extension (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(MediaType::Jpeg)
        } else if lower.ends_with(".png") {
            Some(MediaType::Png)
        } else {
            None
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }
}

/// The cover image found in the source, shared by every output part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverAsset {
    /// Base name of the source entry, used as the member name in outputs.
    pub name: String,
    pub data: Vec<u8>,
    pub media_type: MediaType,
}

/// Everything read from the source before batching starts.
#[derive(Debug, Clone, Default)]
pub struct SourceBook {
    /// Chapters in reading order (ascending entry name).
    pub chapters: Vec<Chapter>,
    pub cover: Option<CoverAsset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_name() {
        assert_eq!(MediaType::from_name("cover.jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_name("cover.JPEG"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_name("img/Cover.PNG"), Some(MediaType::Png));
        assert_eq!(MediaType::from_name("cover.gif"), None);
        assert_eq!(MediaType::from_name("cover"), None);
    }

    #[test]
    fn test_media_type_mime() {
        assert_eq!(MediaType::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(MediaType::Png.mime_type(), "image/png");
    }
}
