//! Lenient extraction of the body fragment from chapter markup.

use std::borrow::Cow;

use memchr::memchr_iter;

/// Pulls the inner body markup out of a content document.
///
/// Implementations must never fail: malformed input produces a best-effort
/// (possibly empty) fragment.
pub trait FragmentExtractor: Send + Sync {
    /// Return the markup between the document's body tags.
    fn extract<'a>(&self, markup: &'a str) -> &'a str;
}

/// Tag-scanning extractor that tolerates broken or non-XML documents.
///
/// The fragment is sliced out of the input without re-serialization, so
/// the bytes inside the body are preserved exactly. Surrounding whitespace
/// is trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientExtractor;

impl FragmentExtractor for LenientExtractor {
    fn extract<'a>(&self, markup: &'a str) -> &'a str {
        let bytes = markup.as_bytes();

        let (start, end) = if let Some(body) = find_tag(bytes, b"body", 0) {
            let start = tag_end(bytes, body);
            let end = find_closing(bytes, b"body", start)
                .or_else(|| find_closing(bytes, b"html", start))
                .unwrap_or(bytes.len());
            (start, end)
        } else if let Some(html) = find_tag(bytes, b"html", 0) {
            let start = find_closing(bytes, b"head", html)
                .map(|head| tag_end(bytes, head))
                .unwrap_or_else(|| tag_end(bytes, html));
            let end = find_closing(bytes, b"html", start).unwrap_or(bytes.len());
            (start, end)
        } else {
            (prolog_end(bytes), bytes.len())
        };

        // Positions always sit on ASCII bytes, so slicing keeps UTF-8 valid.
        markup.get(start..end).unwrap_or_default().trim()
    }
}

/// Decode chapter bytes to text.
///
/// Tries UTF-8 first (BOM aware), then the encoding named in the XML
/// declaration, then Windows-1252.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = extract_xml_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding name from an `<?xml ... encoding="..."?>` declaration.
fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];
    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Position of the first `<name` opening tag at or after `from`.
fn find_tag(bytes: &[u8], name: &[u8], from: usize) -> Option<usize> {
    find_markup(bytes, name, from, false)
}

/// Position of the last `</name` closing tag at or after `from`.
fn find_closing(bytes: &[u8], name: &[u8], from: usize) -> Option<usize> {
    find_markup(bytes, name, from, true)
}

fn find_markup(bytes: &[u8], name: &[u8], from: usize, closing: bool) -> Option<usize> {
    let haystack = bytes.get(from..)?;
    let mut found = None;

    for pos in memchr_iter(b'<', haystack) {
        let mut rest = &haystack[pos + 1..];
        if closing {
            match rest.strip_prefix(b"/") {
                Some(r) => rest = r,
                None => continue,
            }
        }
        if rest.len() < name.len() || !rest[..name.len()].eq_ignore_ascii_case(name) {
            continue;
        }
        let boundary = rest.get(name.len()).copied();
        if !matches!(boundary, None | Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')) {
            continue;
        }

        found = Some(from + pos);
        // Opening tags want the first match, closing tags the last one.
        if !closing {
            break;
        }
    }

    found
}

/// Index just past the `>` closing the tag that starts at `tag_start`.
///
/// Quoted attribute values may contain `>`; an unterminated tag runs to
/// the end of input.
fn tag_end(bytes: &[u8], tag_start: usize) -> usize {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(tag_start) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return i + 1,
            _ => {}
        }
    }
    bytes.len()
}

/// Skip a leading XML declaration, doctype and comments.
fn prolog_end(bytes: &[u8]) -> usize {
    let mut pos = 0;
    loop {
        let rest = &bytes[pos..];
        let skipped = rest.len() - rest.trim_ascii_start().len();
        let rest = &rest[skipped..];
        if rest.starts_with(b"<?") || rest.starts_with(b"<!") {
            pos = tag_end(bytes, pos + skipped);
        } else {
            return pos;
        }
    }
}
