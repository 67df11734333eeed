//! Well-formedness check for generated documents.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::package::{CONTAINER_PATH, CONTAINER_XML, NCX_PATH, OPF_PATH, OutputPackage};

impl OutputPackage<'_> {
    /// Names of generated XML members that do not parse as XML.
    ///
    /// Nothing is escaped on output, so unusual titles or non-XHTML chapter
    /// markup show up here. The package is still written as-is.
    pub fn malformed_documents(&self) -> Vec<&str> {
        let mut documents: Vec<(&str, &str)> = vec![
            (CONTAINER_PATH, CONTAINER_XML),
            (OPF_PATH, &self.opf),
            (NCX_PATH, &self.ncx),
        ];
        documents.extend(
            self.chapters
                .iter()
                .map(|c| (c.href.as_str(), c.document.as_str())),
        );

        documents
            .into_iter()
            .filter(|(_, xml)| !is_well_formed(xml))
            .map(|(name, _)| name)
            .collect()
    }
}

/// Parse `xml` to the end, checking that end tags match their start tags.
pub fn is_well_formed(xml: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;

    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => return depth == 0,
            Err(_) => return false,
            _ => {}
        }
    }
}
