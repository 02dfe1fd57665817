//! Intersection of features across a family of APKs
//!
//! Every reducer is a sequential left fold over the APKs in input order.
//! Set-valued reducers seed from the first APK and intersect each following
//! APK into the running set; the manifest reducer folds the skeleton diff.
//! Bad or missing data from one APK degrades the result but never aborts.

mod fingerprint;
mod tags;

pub use fingerprint::{FeatureSelection, Fingerprint};
pub use tags::{TagCountRange, TagCounts, TRACKED_TAGS};

use crate::apk::{flatten_refs, ApkHandle, TreeMap};
use crate::diff::common;
use crate::manifest::{generalize, normalize, FeatureExtractor};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use tracing::{debug, warn};

/// Result of the manifest intersection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManifestIntersection {
    /// Generalized skeleton; empty when no APK had a manifest
    pub pattern: String,

    pub tag_counts: TagCounts,

    /// Labels of the APKs whose manifest fed the fold
    pub contributors: Vec<String>,
}

/// Result of the dex file-tree intersection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeIntersection {
    /// Full tree mapping of the first APK that had one
    pub reference: Option<TreeMap>,

    /// Content hashes present in every APK that had trees, sorted
    pub hashes: Vec<String>,
}

/// Folds the features of a sequence of APKs into their intersection
pub struct Intersector<'a, A: ApkHandle> {
    apks: &'a [A],
    extractor: FeatureExtractor,
}

impl<'a, A: ApkHandle> Intersector<'a, A> {
    pub fn new(apks: &'a [A]) -> Self {
        Self {
            apks,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Fold all manifests into one match pattern and track tag counts.
    ///
    /// An APK without manifest is skipped entirely, tag counts included.
    pub fn intersect_manifest(&self) -> ManifestIntersection {
        let mut tag_counts = TagCounts::new();
        let mut contributors = Vec::new();
        let mut skeleton: Option<String> = None;

        for apk in self.apks {
            let manifest = match apk.org_manifest() {
                Some(text) if !text.is_empty() => normalize(&text),
                _ => {
                    warn!("{}: no manifest, skipped", apk.label());
                    continue;
                }
            };

            skeleton = Some(match skeleton {
                None => manifest,
                Some(acc) => common(&acc, &manifest),
            });
            contributors.push(apk.label().to_string());

            if let Some(report) = apk.manifest_tag_numbers() {
                tag_counts.observe(&report);
            }
        }

        let pattern = skeleton.as_deref().map(generalize).unwrap_or_default();
        debug!(
            "Manifest intersection over {} APKs: {} chars",
            contributors.len(),
            pattern.len()
        );

        ManifestIntersection {
            pattern,
            tag_counts,
            contributors,
        }
    }

    /// Tag count ranges over every APK that reports counts, whether or not
    /// it has a manifest
    pub fn intersect_manifest_tag_numbers(&self) -> TagCounts {
        let mut tag_counts = TagCounts::new();
        for apk in self.apks {
            match apk.manifest_tag_numbers() {
                Some(report) => tag_counts.observe(&report),
                None => debug!("{}: no manifest tag numbers", apk.label()),
            }
        }
        tag_counts
    }

    /// Permissions declared by every APK
    pub fn intersect_permissions(&self) -> Vec<String> {
        fold_sets(self.apks.iter().map(|apk| {
            apk.org_manifest()
                .map(|text| self.extractor.permissions(&text))
                .unwrap_or_default()
        }))
    }

    /// Intent actions declared by every APK
    pub fn intersect_actions(&self) -> Vec<String> {
        fold_sets(self.apks.iter().map(|apk| {
            apk.org_manifest()
                .map(|text| self.extractor.actions(&text))
                .unwrap_or_default()
        }))
    }

    /// Strings used by app code in every APK. Classes whose name contains
    /// any of `filters` (library/framework packages) are left out.
    pub fn intersect_dex_string_refx<S: AsRef<str>>(&self, filters: &[S]) -> Vec<String> {
        fold_sets(
            self.apks
                .iter()
                .map(|apk| flatten_refs(&apk.strings_refx(), filters)),
        )
    }

    /// API call strings used in every APK
    pub fn intersect_dex_apis(&self) -> Vec<String> {
        fold_sets(
            self.apks
                .iter()
                .map(|apk| flatten_refs::<&str>(&apk.methods_refx(), &[])),
        )
    }

    /// Raw dex pool strings present in every APK
    pub fn intersect_dex_strings(&self) -> Vec<String> {
        fold_sets(
            self.apks
                .iter()
                .map(|apk| apk.strings().iter().cloned().collect::<HashSet<_>>()),
        )
    }

    /// Archive entry names present in every APK
    pub fn intersect_resources(&self) -> Vec<String> {
        fold_sets(self.apks.iter().map(|apk| {
            apk.files()
                .iter()
                .map(|entry| entry.name.clone())
                .collect::<HashSet<_>>()
        }))
    }

    /// Dex tree hashes shared by every APK that has trees.
    ///
    /// Unlike the other reducers, an APK without trees contributes nothing
    /// instead of emptying the result.
    pub fn intersect_dex_tree(&self) -> TreeIntersection {
        let mut reference: Option<TreeMap> = None;
        let mut hashes: Option<HashSet<String>> = None;

        for apk in self.apks {
            let trees = match apk.trees() {
                Some(trees) if !trees.is_empty() => trees,
                _ => {
                    debug!("{}: no dex trees", apk.label());
                    continue;
                }
            };

            hashes = Some(match hashes {
                None => trees.keys().cloned().collect(),
                Some(mut acc) => {
                    acc.retain(|hash| trees.contains_key(hash));
                    acc
                }
            });

            if reference.is_none() {
                reference = Some(trees.into_owned());
            }
        }

        TreeIntersection {
            reference,
            hashes: sorted(hashes.unwrap_or_default()),
        }
    }
}

/// Seed with the first set and intersect the rest into it. Stops pulling
/// sets once the running intersection is empty.
pub fn fold_sets<T, I>(sets: I) -> Vec<T>
where
    T: Eq + Hash + Ord,
    I: IntoIterator<Item = HashSet<T>>,
{
    let mut sets = sets.into_iter();
    let Some(mut acc) = sets.next() else {
        return Vec::new();
    };

    while !acc.is_empty() {
        match sets.next() {
            Some(set) => acc.retain(|item| set.contains(item)),
            None => break,
        }
    }

    sorted(acc)
}

fn sorted<T: Ord>(set: HashSet<T>) -> Vec<T> {
    set.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}
