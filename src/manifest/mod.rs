//! Manifest text handling: feature extraction, normalization and the
//! generalized match pattern produced by the manifest intersection.
//!
//! Everything here works on raw text and never assumes well-formed XML.

mod extract;
mod normalize;
mod pattern;

pub use extract::FeatureExtractor;
pub use normalize::normalize;
pub use pattern::{generalize, ManifestPattern, VALUE_TOKEN};
