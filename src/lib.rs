//! apkintersect - Family fingerprints for Android APKs
//!
//! Given a set of related or repackaged APKs, this library computes what
//! all of them have in common and masks per-sample variation.
//!
//! # Architecture
//!
//! 1. **APK data** - Per-APK features come through the capability traits
//!    in [`apk`] (a JSON/YAML [`ApkDump`] is provided)
//! 2. **Diff** - A generic sequence diff and the manifest skeleton reducer
//! 3. **Manifest** - Text normalization, permission/action extraction and
//!    the generalized match pattern
//! 4. **Intersection** - Left folds of every feature family across the APKs
//! 5. **Reporting** - Terminal and JSON output

pub mod apk;
pub mod config;
pub mod diff;
pub mod intersect;
pub mod manifest;
pub mod report;

pub use apk::{ApkDump, ApkHandle, FileEntry, StringRefs, TagNumbers, TreeMap, TreeNode};
pub use config::Config;
pub use diff::common;
pub use intersect::{
    FeatureSelection, Fingerprint, Intersector, ManifestIntersection, TagCountRange, TagCounts,
    TreeIntersection,
};
pub use manifest::{normalize, FeatureExtractor, ManifestPattern};
pub use report::{ReportFormat, Reporter};
