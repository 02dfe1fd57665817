//! Turning a manifest skeleton into a reusable match pattern

use super::normalize;
use crate::diff::WILDCARD;
use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

/// Stands for any non-empty quoted attribute value
pub const VALUE_TOKEN: &str = r#""[^"]+?""#;

/// What [`VALUE_TOKEN`] compiles to. The run may cross quotes, since a
/// wildcard in the skeleton can cover a dropped or inserted attribute.
const VALUE_EXPR: &str = r#"".+?""#;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).unwrap());

/// Replace every quoted value that contains a wildcard with [`VALUE_TOKEN`].
///
/// `<x a="*"/>` becomes `<x a="[^"]+?"/>`. Quotes pair up left to right, so
/// a wildcard sitting between two values leaves both untouched.
pub fn generalize(skeleton: &str) -> String {
    QUOTED
        .replace_all(skeleton, |caps: &Captures| {
            let quoted = &caps[0];
            if quoted.contains(WILDCARD) {
                VALUE_TOKEN.to_string()
            } else {
                quoted.to_string()
            }
        })
        .into_owned()
}

/// A compiled manifest-intersection pattern.
///
/// Apart from literal text, the pattern holds two placeholders:
/// [`VALUE_TOKEN`] for a non-empty quoted run and the bare wildcard for any
/// run of characters, possibly empty.
#[derive(Debug, Clone)]
pub struct ManifestPattern {
    source: String,
    regex: Regex,
}

impl ManifestPattern {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let mut expr = String::from("(?s)^");
        for (i, piece) in pattern.split(VALUE_TOKEN).enumerate() {
            if i > 0 {
                expr.push_str(VALUE_EXPR);
            }
            for (j, literal) in piece.split(WILDCARD).enumerate() {
                if j > 0 {
                    expr.push_str(".*?");
                }
                expr.push_str(&regex::escape(literal));
            }
        }
        expr.push('$');

        let regex = RegexBuilder::new(&expr)
            .size_limit(64 * (1 << 20))
            .build()?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern text this matcher was built from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check a raw manifest against the pattern (normalized first)
    pub fn is_match(&self, manifest: &str) -> bool {
        self.regex.is_match(&normalize(manifest))
    }
}
