//! Feature dumps produced by an external APK extractor
//!
//! A dump is a JSON or YAML document holding everything the intersection
//! engine asks of an APK. Every field is optional.

use super::{
    ApkHandle, FileEntry, FileEnumerator, ManifestProvider, StringRefProvider, StringRefs,
    TagCounter, TagNumbers, TreeMap, TreeProvider,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Dump loading errors
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to read dump file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse JSON dump: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to parse YAML dump: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// An APK's extracted features, loaded from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApkDump {
    /// Display name; defaults to the dump's file stem
    pub label: String,

    /// Decoded AndroidManifest.xml
    pub manifest: Option<String>,

    pub manifest_tag_numbers: Option<TagNumbers>,

    pub strings_refx: StringRefs,

    pub methods_refx: StringRefs,

    pub strings: Vec<String>,

    pub files: Vec<FileEntry>,

    pub trees: Option<TreeMap>,
}

impl ApkDump {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Load a dump, choosing the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, DumpError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let mut dump: ApkDump = match extension {
            "yml" | "yaml" => serde_yaml::from_reader(reader)?,
            _ => serde_json::from_reader(reader)?,
        };

        if dump.label.is_empty() {
            dump.label = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
        }

        debug!(
            "Loaded dump {}: manifest={}, {} strings, {} files",
            dump.label,
            dump.manifest.is_some(),
            dump.strings.len(),
            dump.files.len()
        );

        Ok(dump)
    }
}

impl ManifestProvider for ApkDump {
    fn org_manifest(&self) -> Option<Cow<'_, str>> {
        self.manifest.as_deref().map(Cow::Borrowed)
    }
}

impl TagCounter for ApkDump {
    fn manifest_tag_numbers(&self) -> Option<Cow<'_, TagNumbers>> {
        self.manifest_tag_numbers.as_ref().map(Cow::Borrowed)
    }
}

impl StringRefProvider for ApkDump {
    fn strings_refx(&self) -> Cow<'_, StringRefs> {
        Cow::Borrowed(&self.strings_refx)
    }

    fn methods_refx(&self) -> Cow<'_, StringRefs> {
        Cow::Borrowed(&self.methods_refx)
    }

    fn strings(&self) -> Cow<'_, [String]> {
        Cow::Borrowed(&self.strings)
    }
}

impl FileEnumerator for ApkDump {
    fn files(&self) -> Cow<'_, [FileEntry]> {
        Cow::Borrowed(&self.files)
    }
}

impl TreeProvider for ApkDump {
    fn trees(&self) -> Option<Cow<'_, TreeMap>> {
        self.trees.as_ref().map(Cow::Borrowed)
    }
}

impl ApkHandle for ApkDump {
    fn label(&self) -> &str {
        &self.label
    }
}
