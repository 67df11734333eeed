//! In-memory description of one output EPUB.
//!
//! Titles, identifiers and chapter fragments are interpolated into the
//! generated documents verbatim, without XML escaping. A title containing
//! `&` or `<` therefore yields a document that is not well-formed; use
//! [`OutputPackage::malformed_documents`] to detect that case.

use crate::batch::Batch;
use crate::config::NamingPolicy;
use crate::model::CoverAsset;

/// Member name of the package document.
pub const OPF_PATH: &str = "content.opf";
/// Member name of the NCX navigation document.
pub const NCX_PATH: &str = "toc.ncx";
/// Member name of the shared stylesheet.
pub const STYLESHEET_PATH: &str = "styles.css";
/// Member name of the OCF container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Container descriptor pointing at [`OPF_PATH`].
pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Stylesheet included in every part.
pub const STYLESHEET: &str = r#"
body {
  text-align: justify;
}

h1 {
  font-size: 160%;
  padding: 1em;
}

p {
  text-indent: 2em;
  margin: 0 0 1em 0;
}
"#;

const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Shared inputs for every part of one split.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    /// Source book name, used in default titles and identifiers.
    pub base_name: String,
    /// Explicit title replacing `"{base_name} {start}-{end}"`.
    pub title: Option<String>,
    pub cover: Option<&'a CoverAsset>,
}

impl<'a> BuildContext<'a> {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            title: None,
            cover: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_cover(mut self, cover: Option<&'a CoverAsset>) -> Self {
        self.cover = cover;
        self
    }

    pub fn naming(&self) -> NamingPolicy {
        match &self.title {
            Some(title) => NamingPolicy::Titled(title.clone()),
            None => NamingPolicy::Positional,
        }
    }
}

/// One `<item>` of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<&'static str>,
}

impl ManifestItem {
    fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }
}

/// One `<navPoint>` of the NCX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub id: String,
    pub play_order: usize,
    pub label: String,
    pub src: String,
}

/// A chapter wrapped into a standalone XHTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDocument {
    /// Manifest id, `chap{n}` with `n` counted from 1 within the part.
    pub id: String,
    /// Member name and manifest href (the chapter's file name).
    pub href: String,
    pub document: String,
}

/// Everything needed to serialize one part.
#[derive(Debug, Clone)]
pub struct OutputPackage<'a> {
    /// 1-based position of this part among all parts of the split.
    pub index: usize,
    pub batch: Batch<'a>,
    /// Display title (`dc:title` and NCX `docTitle`).
    pub title: String,
    /// `dc:identifier` and NCX `dtb:uid`.
    pub identifier: String,
    /// File name the part is written to.
    pub file_name: String,
    pub cover: Option<&'a CoverAsset>,
    pub manifest: Vec<ManifestItem>,
    /// Manifest ids in reading order.
    pub spine: Vec<String>,
    pub nav_points: Vec<NavPoint>,
    pub chapters: Vec<ChapterDocument>,
    pub opf: String,
    pub ncx: String,
}

/// A named blob to store in the output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

impl OutputPackage<'_> {
    /// Container members in write order, excluding `mimetype`.
    ///
    /// The writer always emits `mimetype` itself, before these.
    pub fn members(&self) -> Vec<Member<'_>> {
        let mut members = Vec::with_capacity(self.chapters.len() + 5);

        members.push(Member {
            name: CONTAINER_PATH,
            data: CONTAINER_XML.as_bytes(),
        });
        if let Some(cover) = self.cover {
            members.push(Member {
                name: &cover.name,
                data: &cover.data,
            });
        }
        members.push(Member {
            name: STYLESHEET_PATH,
            data: STYLESHEET.as_bytes(),
        });
        for chapter in &self.chapters {
            members.push(Member {
                name: &chapter.href,
                data: chapter.document.as_bytes(),
            });
        }
        members.push(Member {
            name: OPF_PATH,
            data: self.opf.as_bytes(),
        });
        members.push(Member {
            name: NCX_PATH,
            data: self.ncx.as_bytes(),
        });

        members
    }
}

/// Builds an [`OutputPackage`] for each batch of a split.
///
/// # Example
///
/// ```
/// use quire::{BuildContext, Chapter, PackageBuilder, fixed_batches};
///
/// let chapters = vec![
///     Chapter::new("a.xhtml", "<p>A</p>", "a"),
///     Chapter::new("b.xhtml", "<p>B</p>", "b"),
/// ];
/// let batches = fixed_batches(&chapters, 1)?;
/// let builder = PackageBuilder::new(BuildContext::new("saga"));
///
/// let second = builder.build(batches[1], 2);
/// assert_eq!(second.title, "saga 2-2");
/// assert_eq!(second.file_name, "saga_2_2.epub");
/// assert_eq!(second.spine, vec!["chap1"]);
/// # Ok::<(), quire::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PackageBuilder<'a> {
    context: BuildContext<'a>,
    naming: NamingPolicy,
}

impl<'a> PackageBuilder<'a> {
    pub fn new(context: BuildContext<'a>) -> Self {
        let naming = context.naming();
        Self { context, naming }
    }

    pub fn context(&self) -> &BuildContext<'a> {
        &self.context
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    /// Display title of a batch.
    pub fn display_title(&self, batch: &Batch<'_>) -> String {
        match &self.context.title {
            Some(title) => title.clone(),
            None => format!("{} {}-{}", self.context.base_name, batch.start, batch.end),
        }
    }

    /// Output file name of a batch.
    pub fn file_name(&self, batch: &Batch<'_>) -> String {
        self.naming
            .file_name(&self.context.base_name, batch.start, batch.end)
    }

    /// Describe the part for `batch`, the `index`-th of the split.
    pub fn build<'b>(&self, batch: Batch<'b>, index: usize) -> OutputPackage<'b>
    where
        'a: 'b,
    {
        let title = self.display_title(&batch);
        let identifier = format!("{}_part_{}", self.context.base_name, index);
        let cover = self.context.cover;

        let mut manifest = Vec::with_capacity(batch.len() + 3);
        let mut spine = Vec::with_capacity(batch.len());
        let mut nav_points = Vec::with_capacity(batch.len() + 1);
        let mut chapters = Vec::with_capacity(batch.len());

        if let Some(cover) = cover {
            manifest.push(ManifestItem {
                properties: Some("cover-image"),
                ..ManifestItem::new("cover", &cover.name, cover.media_type.mime_type())
            });
            nav_points.push(NavPoint {
                id: "navPoint-0".to_string(),
                play_order: 0,
                label: "Cover".to_string(),
                src: cover.name.clone(),
            });
        }
        manifest.push(ManifestItem::new("css", STYLESHEET_PATH, "text/css"));

        for (n, chapter) in batch.chapters.iter().enumerate().map(|(i, c)| (i + 1, c)) {
            let id = format!("chap{n}");
            manifest.push(ManifestItem::new(&id, &chapter.file_name, XHTML_MEDIA_TYPE));
            spine.push(id.clone());
            nav_points.push(NavPoint {
                id: format!("navPoint-{n}"),
                play_order: n,
                label: chapter.title.clone(),
                src: chapter.file_name.clone(),
            });
            chapters.push(ChapterDocument {
                id,
                href: chapter.file_name.clone(),
                document: chapter_document(&chapter.title, &chapter.content),
            });
        }

        manifest.push(ManifestItem::new(
            "ncx",
            NCX_PATH,
            "application/x-dtbncx+xml",
        ));

        let opf = generate_opf(&title, &identifier, cover.is_some(), &manifest, &spine);
        let ncx = generate_ncx(&title, &identifier, &nav_points);

        OutputPackage {
            index,
            file_name: self.file_name(&batch),
            batch,
            title,
            identifier,
            cover,
            manifest,
            spine,
            nav_points,
            chapters,
            opf,
            ncx,
        }
    }
}

/// Wrap a body fragment into a minimal XHTML document.
pub fn chapter_document(title: &str, content: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="{STYLESHEET_PATH}"/>
</head>
<body>
{content}
</body>
</html>
"#
    )
}

fn generate_opf(
    title: &str,
    identifier: &str,
    has_cover: bool,
    manifest: &[ManifestItem],
    spine: &[String],
) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );
    opf.push_str(&format!("    <dc:title>{title}</dc:title>\n"));
    opf.push_str("    <dc:language>en</dc:language>\n");
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{identifier}</dc:identifier>\n"
    ));
    if has_cover {
        opf.push_str("    <meta name=\"cover\" content=\"cover\"/>\n");
    }
    opf.push_str("  </metadata>\n  <manifest>\n");

    for item in manifest {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
            item.id, item.href, item.media_type
        ));
        if let Some(properties) = item.properties {
            opf.push_str(&format!(" properties=\"{properties}\""));
        }
        opf.push_str("/>\n");
    }

    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
    for idref in spine {
        opf.push_str(&format!("    <itemref idref=\"{idref}\"/>\n"));
    }
    opf.push_str("  </spine>\n</package>\n");

    opf
}

fn generate_ncx(title: &str, identifier: &str, nav_points: &[NavPoint]) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{identifier}\"/>\n"
    ));
    ncx.push_str(
        r#"    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
"#,
    );
    ncx.push_str(&format!("  <docTitle><text>{title}</text></docTitle>\n"));
    ncx.push_str("  <navMap>\n");

    for point in nav_points {
        ncx.push_str(&format!(
            "    <navPoint id=\"{}\" playOrder=\"{}\">\n",
            point.id, point.play_order
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            point.label
        ));
        ncx.push_str(&format!("      <content src=\"{}\"/>\n", point.src));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{fixed_batches, single_range};
    use crate::import::{FragmentExtractor, LenientExtractor};
    use crate::model::{Chapter, MediaType};
    use std::collections::HashSet;

    fn chapters(names: &[&str]) -> Vec<Chapter> {
        names
            .iter()
            .map(|name| {
                Chapter::new(
                    *name,
                    format!("<h1>{name}</h1>\n<p>Text of {name}.</p>"),
                    crate::derive_title(name),
                )
            })
            .collect()
    }

    fn cover() -> CoverAsset {
        CoverAsset {
            name: "cover.jpg".into(),
            data: vec![0xFF, 0xD8, 0xFF],
            media_type: MediaType::Jpeg,
        }
    }

    #[test]
    fn test_build_positional() {
        let book = chapters(&["01-one.xhtml", "02-two.xhtml", "03-three.xhtml"]);
        let batches = fixed_batches(&book, 2).unwrap();
        let builder = PackageBuilder::new(BuildContext::new("saga"));

        let first = builder.build(batches[0], 1);
        assert_eq!(first.title, "saga 1-2");
        assert_eq!(first.identifier, "saga_part_1");
        assert_eq!(first.file_name, "saga_1_2.epub");

        let second = builder.build(batches[1], 2);
        assert_eq!(second.title, "saga 3-3");
        assert_eq!(second.identifier, "saga_part_2");
        assert_eq!(second.file_name, "saga_3_3.epub");
        assert_eq!(second.spine, vec!["chap1"]);
        assert_eq!(second.chapters[0].href, "03-three.xhtml");
    }

    #[test]
    fn test_build_range_uses_declared_bounds() {
        let book = chapters(&["a.xhtml", "b.xhtml", "c.xhtml", "d.xhtml"]);
        let batch = single_range(&book, 2, 3).unwrap();
        let builder = PackageBuilder::new(BuildContext::new("saga"));

        let package = builder.build(batch, 1);
        assert_eq!(package.title, "saga 2-3");
        assert_eq!(package.file_name, "saga_2_3.epub");
        assert_eq!(package.spine, vec!["chap1", "chap2"]);
        assert_eq!(package.chapters[0].href, "b.xhtml");
    }

    #[test]
    fn test_build_explicit_title() {
        let book = chapters(&["a.xhtml"]);
        let batches = fixed_batches(&book, 1).unwrap();
        let context = BuildContext::new("saga").with_title(Some("My  Saga Vol 1".into()));
        let package = PackageBuilder::new(context).build(batches[0], 1);

        assert_eq!(package.title, "My  Saga Vol 1");
        assert_eq!(package.file_name, "My_Saga_Vol_1.epub");
        assert!(package.opf.contains("<dc:title>My  Saga Vol 1</dc:title>"));
        assert!(package.ncx.contains("<docTitle><text>My  Saga Vol 1</text></docTitle>"));
    }

    #[test]
    fn test_manifest_order_without_cover() {
        let book = chapters(&["a.xhtml", "b.xhtml"]);
        let batches = fixed_batches(&book, 5).unwrap();
        let package = PackageBuilder::new(BuildContext::new("x")).build(batches[0], 1);

        let ids: Vec<_> = package.manifest.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["css", "chap1", "chap2", "ncx"]);
        assert!(!package.opf.contains("name=\"cover\""));
        assert_eq!(package.nav_points[0].id, "navPoint-1");
        assert_eq!(package.nav_points[0].play_order, 1);
    }

    #[test]
    fn test_manifest_with_cover() {
        let book = chapters(&["a.xhtml"]);
        let cover = cover();
        let batches = fixed_batches(&book, 5).unwrap();
        let context = BuildContext::new("x").with_cover(Some(&cover));
        let package = PackageBuilder::new(context).build(batches[0], 1);

        let first = &package.manifest[0];
        assert_eq!(first.id, "cover");
        assert_eq!(first.href, "cover.jpg");
        assert_eq!(first.media_type, "image/jpeg");
        assert_eq!(first.properties, Some("cover-image"));
        assert!(package.opf.contains(
            r#"<item id="cover" href="cover.jpg" media-type="image/jpeg" properties="cover-image"/>"#
        ));
        assert!(package.opf.contains(r#"<meta name="cover" content="cover"/>"#));

        // The cover is navigable but never part of the reading order.
        assert_eq!(package.spine, vec!["chap1"]);
        assert_eq!(package.nav_points[0].play_order, 0);
        assert_eq!(package.nav_points[0].label, "Cover");
        assert_eq!(package.nav_points[0].src, "cover.jpg");
        assert_eq!(package.nav_points[1].id, "navPoint-1");
    }

    #[test]
    fn test_identifiers_cross_reference() {
        let book = chapters(&["01-a.xhtml", "02-b.xhtml", "03-c.xhtml"]);
        let cover = cover();
        let batches = fixed_batches(&book, 3).unwrap();
        let context = BuildContext::new("x").with_cover(Some(&cover));
        let package = PackageBuilder::new(context).build(batches[0], 1);

        let chapter_items: Vec<_> = package
            .manifest
            .iter()
            .filter(|i| i.media_type == "application/xhtml+xml")
            .collect();
        let ids: HashSet<_> = chapter_items.iter().map(|i| &i.id).collect();
        assert_eq!(ids.len(), chapter_items.len());

        for (n, chapter) in book.iter().enumerate() {
            let item = chapter_items[n];
            assert_eq!(item.id, format!("chap{}", n + 1));
            assert_eq!(item.href, chapter.file_name);
            assert_eq!(package.spine[n], item.id);
            let nav = &package.nav_points[n + 1];
            assert_eq!(nav.src, chapter.file_name);
            assert_eq!(nav.label, chapter.title);
            assert_eq!(package.chapters[n].href, chapter.file_name);
        }
    }

    #[test]
    fn test_chapter_document_round_trip() {
        let book = chapters(&["01-first-light.xhtml", "02-nightfall.xhtml"]);
        let batches = fixed_batches(&book, 2).unwrap();
        let package = PackageBuilder::new(BuildContext::new("x")).build(batches[0], 1);

        for (doc, chapter) in package.chapters.iter().zip(&book) {
            assert!(
                doc.document
                    .contains(&format!("<title>{}</title>", chapter.title))
            );
            assert!(doc.document.contains(r#"href="styles.css""#));
            assert_eq!(LenientExtractor.extract(&doc.document), chapter.content);
        }
    }

    #[test]
    fn test_members_order() {
        let book = chapters(&["a.xhtml", "b.xhtml"]);
        let cover = cover();
        let batches = fixed_batches(&book, 2).unwrap();
        let context = BuildContext::new("x").with_cover(Some(&cover));
        let package = PackageBuilder::new(context).build(batches[0], 1);

        let names: Vec<_> = package.members().iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec![
                "META-INF/container.xml",
                "cover.jpg",
                "styles.css",
                "a.xhtml",
                "b.xhtml",
                "content.opf",
                "toc.ncx",
            ]
        );
        assert_eq!(package.members()[1].data, &cover.data[..]);
    }

    #[test]
    fn test_titles_are_not_escaped() {
        let book = vec![Chapter::new("a.xhtml", "<p/>", "Q&A")];
        let batches = fixed_batches(&book, 1).unwrap();
        let package = PackageBuilder::new(BuildContext::new("x")).build(batches[0], 1);

        assert!(package.ncx.contains("<navLabel><text>Q&A</text></navLabel>"));
        assert!(package.chapters[0].document.contains("<title>Q&A</title>"));
    }
}
