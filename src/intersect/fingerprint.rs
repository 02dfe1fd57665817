use super::{Intersector, ManifestIntersection, TagCounts, TreeIntersection};
use crate::apk::ApkHandle;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which reducers to run when building a fingerprint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSelection {
    pub manifest: bool,
    pub tag_numbers: bool,
    pub permissions: bool,
    pub actions: bool,
    pub string_refs: bool,
    pub apis: bool,
    pub dex_strings: bool,
    pub resources: bool,
    pub trees: bool,
}

impl FeatureSelection {
    /// Names accepted by [`FeatureSelection::only`]
    pub const NAMES: [&'static str; 9] = [
        "manifest",
        "tag_numbers",
        "permissions",
        "actions",
        "string_refs",
        "apis",
        "dex_strings",
        "resources",
        "trees",
    ];

    pub fn none() -> Self {
        Self {
            manifest: false,
            tag_numbers: false,
            permissions: false,
            actions: false,
            string_refs: false,
            apis: false,
            dex_strings: false,
            resources: false,
            trees: false,
        }
    }

    /// Keep only the named features. Unknown names are returned as the error.
    pub fn only<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut selection = Self::none();
        for name in names {
            let name = name.as_ref().trim();
            let flag = match name {
                "manifest" => &mut selection.manifest,
                "tag_numbers" | "tags" => &mut selection.tag_numbers,
                "permissions" => &mut selection.permissions,
                "actions" => &mut selection.actions,
                "string_refs" | "strings_refx" => &mut selection.string_refs,
                "apis" => &mut selection.apis,
                "dex_strings" | "strings" => &mut selection.dex_strings,
                "resources" => &mut selection.resources,
                "trees" => &mut selection.trees,
                other => return Err(other.to_string()),
            };
            *flag = true;
        }
        Ok(selection)
    }
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self {
            manifest: true,
            tag_numbers: true,
            permissions: true,
            actions: true,
            string_refs: true,
            apis: true,
            dex_strings: true,
            resources: true,
            trees: true,
        }
    }
}

/// Everything a family of APKs has in common
#[derive(Debug, Clone, Default, Serialize)]
pub struct Fingerprint {
    pub apk_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestIntersection>,

    /// Tag ranges over all APKs, independent of manifest availability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_numbers: Option<TagCounts>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_refs: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apis: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dex_strings: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trees: Option<TreeIntersection>,
}

impl<'a, A: ApkHandle> Intersector<'a, A> {
    /// Run every selected reducer
    pub fn fingerprint<S: AsRef<str>>(
        &self,
        selection: &FeatureSelection,
        filters: &[S],
    ) -> Fingerprint {
        info!("Intersecting {} APKs", self.apks.len());

        Fingerprint {
            apk_count: self.apks.len(),
            manifest: selection.manifest.then(|| self.intersect_manifest()),
            tag_numbers: selection.tag_numbers.then(|| self.intersect_manifest_tag_numbers()),
            permissions: selection.permissions.then(|| self.intersect_permissions()),
            actions: selection.actions.then(|| self.intersect_actions()),
            string_refs: selection
                .string_refs
                .then(|| self.intersect_dex_string_refx(filters)),
            apis: selection.apis.then(|| self.intersect_dex_apis()),
            dex_strings: selection.dex_strings.then(|| self.intersect_dex_strings()),
            resources: selection.resources.then(|| self.intersect_resources()),
            trees: selection.trees.then(|| self.intersect_dex_tree()),
        }
    }
}
