//! Chapter titles derived from file names.

/// Derive a display title from a chapter file name.
///
/// Drops a trailing `.html`/`.xhtml` (case-sensitive), one leading
/// `<digits>-` prefix, turns the remaining dashes into spaces and trims.
///
/// ```
/// use quire::derive_title;
///
/// assert_eq!(derive_title("12-chapter-one.xhtml"), "chapter one");
/// assert_eq!(derive_title("Intro.html"), "Intro");
/// ```
pub fn derive_title(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".html")
        .or_else(|| file_name.strip_suffix(".xhtml"))
        .unwrap_or(file_name);

    stem_without_number(stem).replace('-', " ").trim().to_string()
}

/// Strip a leading run of ASCII digits followed by `-`.
fn stem_without_number(stem: &str) -> &str {
    let digits = stem.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0
        && let Some(rest) = stem[digits..].strip_prefix('-')
    {
        return rest;
    }
    stem
}
