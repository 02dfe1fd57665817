//! Structural text skeletons
//!
//! A skeleton is the common subsequence of two texts in which every run of
//! divergent characters is replaced by a single [`WILDCARD`]. Folding
//! `common` over N texts yields what all of them share.

use super::{diff, ChangeTag};

/// Marker standing for a divergent run
pub const WILDCARD: char = '*';

/// Reduce two texts to their common skeleton.
///
/// Identical inputs are returned unchanged. Otherwise common characters are
/// kept verbatim and each divergent run collapses to one `*`; a divergence
/// right after a `*` adds nothing, so markers never pile up.
pub fn common(one: &str, two: &str) -> String {
    if one == two {
        return one.to_string();
    }

    let a: Vec<char> = one.chars().collect();
    let b: Vec<char> = two.chars().collect();

    let mut skeleton = String::with_capacity(one.len().max(two.len()));
    for change in diff(&a, &b) {
        match change.tag {
            ChangeTag::Equal => skeleton.push(change.value),
            ChangeTag::Delete | ChangeTag::Insert => {
                if !skeleton.ends_with(WILDCARD) {
                    skeleton.push(WILDCARD);
                }
            }
        }
    }

    skeleton
}

/// Left-fold `common` over `texts` in order. `None` for an empty input.
pub fn fold<'a, I>(texts: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().fold(None, |acc, text| match acc {
        None => Some(text.to_string()),
        Some(skeleton) => Some(common(&skeleton, text)),
    })
}
