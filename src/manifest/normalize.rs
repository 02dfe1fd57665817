use once_cell::sync::Lazy;
use regex::Regex;

static QUOTE_BEFORE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""\s+?>"#).unwrap());
static BETWEEN_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+?<").unwrap());

/// Flatten manifest text to one line so that manifests differing only in
/// indentation or line wrapping compare character-identical.
///
/// Newlines become spaces, whitespace between a closing quote and `>` is
/// dropped, and whitespace between adjacent tags is dropped.
pub fn normalize(manifest: &str) -> String {
    let flat = manifest.replace('\n', " ");
    let flat = QUOTE_BEFORE_CLOSE.replace_all(&flat, "\">");
    BETWEEN_TAGS.replace_all(&flat, "><").into_owned()
}
