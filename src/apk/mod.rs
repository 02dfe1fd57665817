//! Per-APK data contract
//!
//! The intersection engine never parses APKs itself. It consumes already
//! extracted features through the capability traits below, so any parser
//! (or a test double) can feed it.

mod discovery;
mod dump;

pub use discovery::find_dump_files;
pub use dump::{ApkDump, DumpError};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Strings referenced from code: class name -> method name -> strings
pub type StringRefs = HashMap<String, HashMap<String, HashSet<String>>>;

/// Manifest element name -> number of occurrences
pub type TagNumbers = HashMap<String, u64>;

/// Content hash -> dex file tree
pub type TreeMap = HashMap<String, TreeNode>;

/// A file entry enumerated from the APK archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path of the entry inside the archive (e.g. "res/layout/main.xml")
    pub name: String,

    /// Uncompressed size in bytes, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Content digest, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A node of a dex file tree (package / class hierarchy)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// Supplies the raw AndroidManifest.xml text
pub trait ManifestProvider {
    fn org_manifest(&self) -> Option<Cow<'_, str>>;
}

/// Supplies per-tag occurrence counts of the manifest
pub trait TagCounter {
    fn manifest_tag_numbers(&self) -> Option<Cow<'_, TagNumbers>>;
}

/// Supplies dex string data
pub trait StringRefProvider {
    /// Strings used by each method, keyed by class then method
    fn strings_refx(&self) -> Cow<'_, StringRefs>;

    /// API call strings used by each method, same shape as `strings_refx`
    fn methods_refx(&self) -> Cow<'_, StringRefs>;

    /// Every string of the dex string pool
    fn strings(&self) -> Cow<'_, [String]>;
}

/// Enumerates archive entries
pub trait FileEnumerator {
    fn files(&self) -> Cow<'_, [FileEntry]>;
}

/// Supplies dex file trees keyed by content hash
pub trait TreeProvider {
    fn trees(&self) -> Option<Cow<'_, TreeMap>>;
}

/// A parsed APK as seen by the intersection engine
pub trait ApkHandle:
    ManifestProvider + TagCounter + StringRefProvider + FileEnumerator + TreeProvider
{
    /// Identifier used in diagnostics (usually the APK or dump path)
    fn label(&self) -> &str;
}

/// Flatten a string reference table into one set, dropping classes whose
/// name contains any of `filters`
pub fn flatten_refs<S: AsRef<str>>(refs: &StringRefs, filters: &[S]) -> HashSet<String> {
    refs.iter()
        .filter(|(class, _)| !filters.iter().any(|f| class.contains(f.as_ref())))
        .flat_map(|(_, methods)| methods.values())
        .flat_map(|strings| strings.iter().cloned())
        .collect()
}
