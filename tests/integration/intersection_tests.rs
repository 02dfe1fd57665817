//! Integration tests for the intersection reducers
//!
//! These tests drive the `Intersector` with in-memory APK doubles and with
//! the dump fixtures under tests/fixtures/family.

use apkintersect::apk::{
    FileEnumerator, ManifestProvider, StringRefProvider, TagCounter, TreeProvider,
};
use apkintersect::{
    ApkDump, ApkHandle, FeatureSelection, FileEntry, Intersector, StringRefs, TagNumbers, TreeMap,
    TreeNode,
};
use std::borrow::Cow;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_family() -> Vec<ApkDump> {
    ["alpha", "beta", "gamma"]
        .iter()
        .map(|name| {
            let path = fixtures_path().join("family").join(format!("{name}.json"));
            ApkDump::from_file(&path).expect("Failed to load fixture")
        })
        .collect()
}

/// Test double that computes everything on the fly
#[derive(Default)]
struct FakeApk {
    label: String,
    manifest: Option<String>,
    tags: Option<TagNumbers>,
    strings: Vec<String>,
    refs: Vec<(&'static str, &'static str)>,
    apis: Vec<&'static str>,
    files: Vec<&'static str>,
    trees: Option<Vec<&'static str>>,
}

impl FakeApk {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Self::default()
        }
    }

    fn with_manifest(mut self, text: &str) -> Self {
        self.manifest = Some(text.to_string());
        self
    }

    fn with_tags(mut self, pairs: &[(&str, u64)]) -> Self {
        self.tags = Some(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect());
        self
    }

    fn with_strings(mut self, strings: &[&str]) -> Self {
        self.strings = strings.iter().map(|s| s.to_string()).collect();
        self
    }

    /// (class, string) pairs, all under method "m"
    fn with_refs(mut self, refs: &[(&'static str, &'static str)]) -> Self {
        self.refs = refs.to_vec();
        self
    }

    fn with_apis(mut self, apis: &[&'static str]) -> Self {
        self.apis = apis.to_vec();
        self
    }

    fn with_files(mut self, files: &[&'static str]) -> Self {
        self.files = files.to_vec();
        self
    }

    fn with_trees(mut self, hashes: &[&'static str]) -> Self {
        self.trees = Some(hashes.to_vec());
        self
    }
}

impl ManifestProvider for FakeApk {
    fn org_manifest(&self) -> Option<Cow<'_, str>> {
        self.manifest.as_deref().map(Cow::Borrowed)
    }
}

impl TagCounter for FakeApk {
    fn manifest_tag_numbers(&self) -> Option<Cow<'_, TagNumbers>> {
        self.tags.as_ref().map(Cow::Borrowed)
    }
}

impl StringRefProvider for FakeApk {
    fn strings_refx(&self) -> Cow<'_, StringRefs> {
        let mut refs = StringRefs::new();
        for (class, string) in &self.refs {
            refs.entry(class.to_string())
                .or_default()
                .entry("m".to_string())
                .or_default()
                .insert(string.to_string());
        }
        Cow::Owned(refs)
    }

    fn methods_refx(&self) -> Cow<'_, StringRefs> {
        let mut refs = StringRefs::new();
        for api in &self.apis {
            refs.entry("LApp;".to_string())
                .or_default()
                .entry("run".to_string())
                .or_default()
                .insert(api.to_string());
        }
        Cow::Owned(refs)
    }

    fn strings(&self) -> Cow<'_, [String]> {
        Cow::Borrowed(&self.strings)
    }
}

impl FileEnumerator for FakeApk {
    fn files(&self) -> Cow<'_, [FileEntry]> {
        Cow::Owned(self.files.iter().map(|name| FileEntry::new(*name)).collect())
    }
}

impl TreeProvider for FakeApk {
    fn trees(&self) -> Option<Cow<'_, TreeMap>> {
        self.trees.as_ref().map(|hashes| {
            Cow::Owned(
                hashes
                    .iter()
                    .map(|hash| {
                        let node = TreeNode::leaf(format!("{}:{hash}", self.label));
                        (hash.to_string(), node)
                    })
                    .collect(),
            )
        })
    }
}

impl ApkHandle for FakeApk {
    fn label(&self) -> &str {
        &self.label
    }
}

// ============================================================================
// Manifest intersection
// ============================================================================

#[test]
fn test_manifest_example_from_two_apks() {
    let apks = vec![
        FakeApk::new("a").with_manifest(r#"<x a="1"/>"#),
        FakeApk::new("b").with_manifest(r#"<x a="2"/>"#),
    ];
    let result = Intersector::new(&apks).intersect_manifest();

    assert_eq!(result.pattern, r#"<x a="[^"]+?"/>"#);
    assert_eq!(result.contributors, vec!["a", "b"]);
}

#[test]
fn test_manifest_single_apk_is_normalized_text() {
    let apks = vec![FakeApk::new("a").with_manifest("<a>\n  <b c=\"1\"\n  >\n</a>")];
    let result = Intersector::new(&apks).intersect_manifest();
    assert_eq!(result.pattern, "<a><b c=\"1\"></a>");
}

#[test]
fn test_manifest_skips_apks_without_manifest() {
    let apks = vec![
        FakeApk::new("none").with_tags(&[("activity", 40)]),
        FakeApk::new("a").with_manifest(r#"<x a="1"/>"#).with_tags(&[("activity", 2)]),
        FakeApk::new("empty").with_manifest(""),
        FakeApk::new("b").with_manifest(r#"<x a="1"/>"#).with_tags(&[("activity", 5)]),
    ];
    let result = Intersector::new(&apks).intersect_manifest();

    assert_eq!(result.pattern, r#"<x a="1"/>"#);
    assert_eq!(result.contributors, vec!["a", "b"]);

    // The skipped APK's tag counts are not folded
    let activity = result.tag_counts.get("activity").unwrap();
    assert_eq!((activity.min, activity.max), (2, 5));
}

#[test]
fn test_manifest_without_any_manifest() {
    let apks = vec![FakeApk::new("a"), FakeApk::new("b")];
    let result = Intersector::new(&apks).intersect_manifest();

    assert_eq!(result.pattern, "");
    assert!(result.contributors.is_empty());
    assert!(result.tag_counts.iter().all(|(_, range)| range.is_unset()));
}

#[test]
fn test_manifest_tag_numbers_ignore_manifest_availability() {
    let apks = vec![
        FakeApk::new("none").with_tags(&[("activity", 40)]),
        FakeApk::new("a").with_manifest("<x/>").with_tags(&[("activity", 2), ("service", 1)]),
        FakeApk::new("silent").with_manifest("<x/>"),
    ];
    let counts = Intersector::new(&apks).intersect_manifest_tag_numbers();

    let activity = counts.get("activity").unwrap();
    assert_eq!((activity.min, activity.max, activity.samples), (2, 40, 2));
    let provider = counts.get("provider").unwrap();
    assert_eq!((provider.min, provider.max), (0xFF, 0));
}

#[test]
fn test_tag_ranges_bound_every_observation() {
    let observed = [
        [("uses-permission", 3), ("activity", 1), ("version_code", 300)],
        [("uses-permission", 9), ("activity", 0), ("version_code", 12)],
        [("uses-permission", 5), ("activity", 4), ("version_code", 70)],
    ];
    let apks: Vec<_> = observed
        .iter()
        .enumerate()
        .map(|(i, pairs)| FakeApk::new(&i.to_string()).with_manifest("<m/>").with_tags(pairs))
        .collect();
    let counts = Intersector::new(&apks).intersect_manifest().tag_counts;

    for pairs in &observed {
        for (tag, value) in pairs {
            let range = counts.get(tag).unwrap();
            assert!(range.min <= *value && *value <= range.max, "{tag}: {range:?}");
        }
    }
    assert!(counts.get("receiver").unwrap().is_unset());
}

// ============================================================================
// Set reducers
// ============================================================================

#[test]
fn test_permission_intersection() {
    let apks = vec![
        FakeApk::new("a").with_manifest(
            r#"<manifest><uses-permission android:name="READ"/><uses-permission android:name="WRITE"/></manifest>"#,
        ),
        FakeApk::new("b").with_manifest(
            r#"<manifest><uses-permission android:name="WRITE"/><service android:permission="EXEC"/></manifest>"#,
        ),
    ];
    assert_eq!(Intersector::new(&apks).intersect_permissions(), vec!["WRITE"]);
}

#[test]
fn test_permission_intersection_with_missing_manifest_is_empty() {
    let apks = vec![
        FakeApk::new("a").with_manifest(r#"<uses-permission android:name="WRITE"/>"#),
        FakeApk::new("b"),
    ];
    assert!(Intersector::new(&apks).intersect_permissions().is_empty());
}

#[test]
fn test_action_intersection() {
    let apks = vec![
        FakeApk::new("a").with_manifest(
            r#"<action android:name="BOOT"/><action android:name="SMS"/>"#,
        ),
        FakeApk::new("b").with_manifest(r#"<action android:name="SMS"/>"#),
    ];
    assert_eq!(Intersector::new(&apks).intersect_actions(), vec!["SMS"]);
}

#[test]
fn test_string_refs_respect_filters() {
    let apks = vec![
        FakeApk::new("a").with_refs(&[("Lcom/app/A;", "secret"), ("Landroid/Lib;", "lib")]),
        FakeApk::new("b").with_refs(&[("Lcom/app/B;", "secret"), ("Landroid/Lib;", "lib")]),
    ];
    let intersector = Intersector::new(&apks);

    assert_eq!(intersector.intersect_dex_string_refx(&["Landroid/"]), vec!["secret"]);
    assert_eq!(
        intersector.intersect_dex_string_refx::<&str>(&[]),
        vec!["lib", "secret"]
    );
}

#[test]
fn test_api_intersection() {
    let apks = vec![
        FakeApk::new("a").with_apis(&["Lx;->send()V", "Lx;->recv()V"]),
        FakeApk::new("b").with_apis(&["Lx;->recv()V", "Ly;->other()V"]),
        FakeApk::new("c").with_apis(&["Lx;->recv()V"]),
    ];
    assert_eq!(Intersector::new(&apks).intersect_dex_apis(), vec!["Lx;->recv()V"]);
}

#[test]
fn test_dex_string_intersection_is_sorted() {
    let apks = vec![
        FakeApk::new("a").with_strings(&["zeta", "alpha", "mid", "alpha"]),
        FakeApk::new("b").with_strings(&["mid", "zeta", "alpha", "other"]),
    ];
    assert_eq!(
        Intersector::new(&apks).intersect_dex_strings(),
        vec!["alpha", "mid", "zeta"]
    );
}

#[test]
fn test_resource_intersection() {
    let apks = vec![
        FakeApk::new("a").with_files(&["classes.dex", "res/a.png", "assets/payload"]),
        FakeApk::new("b").with_files(&["assets/payload", "classes.dex"]),
    ];
    assert_eq!(
        Intersector::new(&apks).intersect_resources(),
        vec!["assets/payload", "classes.dex"]
    );
}

#[test]
fn test_set_reducers_are_permutation_invariant() {
    let make = |label: &str, strings: &[&str]| FakeApk::new(label).with_strings(strings);
    let a = ["s1", "s2", "s3", "s4"];
    let b = ["s2", "s3", "s4", "s5"];
    let c = ["s3", "s4", "s1"];

    let orders: [[&[&str]; 3]; 3] = [[&a, &b, &c], [&c, &a, &b], [&b, &c, &a]];
    for order in orders {
        let apks: Vec<_> = order.iter().map(|s| make("x", *s)).collect();
        assert_eq!(Intersector::new(&apks).intersect_dex_strings(), vec!["s3", "s4"]);
    }
}

// ============================================================================
// Dex trees
// ============================================================================

#[test]
fn test_tree_intersection_skips_apks_without_trees() {
    let apks = vec![
        FakeApk::new("none"),
        FakeApk::new("a").with_trees(&["h1", "h2", "h3"]),
        FakeApk::new("empty").with_trees(&[]),
        FakeApk::new("b").with_trees(&["h3", "h2", "h9"]),
    ];
    let result = Intersector::new(&apks).intersect_dex_tree();

    assert_eq!(result.hashes, vec!["h2", "h3"]);
    let reference = result.reference.unwrap();
    assert_eq!(reference.len(), 3);
    assert_eq!(reference["h1"].name, "a:h1");
}

#[test]
fn test_tree_intersection_without_trees() {
    let apks = vec![FakeApk::new("a"), FakeApk::new("b").with_trees(&[])];
    let result = Intersector::new(&apks).intersect_dex_tree();
    assert!(result.reference.is_none());
    assert!(result.hashes.is_empty());
}

// ============================================================================
// Empty inputs
// ============================================================================

#[test]
fn test_zero_apks_give_empty_results() {
    let apks: Vec<FakeApk> = Vec::new();
    let intersector = Intersector::new(&apks);

    let manifest = intersector.intersect_manifest();
    assert_eq!(manifest.pattern, "");
    assert!(manifest.tag_counts.iter().all(|(_, r)| r.min == 0xFF && r.max == 0));

    assert!(intersector.intersect_permissions().is_empty());
    assert!(intersector.intersect_actions().is_empty());
    assert!(intersector.intersect_dex_string_refx(&["L"]).is_empty());
    assert!(intersector.intersect_dex_apis().is_empty());
    assert!(intersector.intersect_dex_strings().is_empty());
    assert!(intersector.intersect_resources().is_empty());
    assert!(intersector.intersect_dex_tree().hashes.is_empty());
}

#[test]
fn test_apks_with_no_features_give_empty_results() {
    let apks = vec![FakeApk::new("a"), FakeApk::new("b")];
    let fingerprint =
        Intersector::new(&apks).fingerprint::<&str>(&FeatureSelection::default(), &[]);

    assert_eq!(fingerprint.apk_count, 2);
    assert_eq!(fingerprint.permissions, Some(vec![]));
    assert_eq!(fingerprint.dex_strings, Some(vec![]));
    assert_eq!(fingerprint.resources, Some(vec![]));
    assert_eq!(fingerprint.trees.unwrap().hashes, Vec::<String>::new());
}

// ============================================================================
// Fixture family
// ============================================================================

#[test]
fn test_family_fixture_fingerprint() {
    let apks = load_family();
    let intersector = Intersector::new(&apks);
    let fingerprint = intersector.fingerprint(&FeatureSelection::default(), &["Landroid/"]);

    assert_eq!(fingerprint.apk_count, 3);
    assert_eq!(
        fingerprint.permissions.unwrap(),
        vec![
            "android.permission.BROADCAST_SMS",
            "android.permission.INTERNET",
            "android.permission.SEND_SMS",
        ]
    );
    assert_eq!(
        fingerprint.actions.unwrap(),
        vec!["android.provider.Telephony.SMS_RECEIVED"]
    );
    assert_eq!(fingerprint.string_refs.unwrap(), vec!["+79991234567", "pdus"]);
    assert_eq!(fingerprint.apis.unwrap().len(), 3);
    assert_eq!(
        fingerprint.dex_strings.unwrap(),
        vec!["+79991234567", "http://fam-c2.example/gate.php", "onReceive", "pdus"]
    );
    assert_eq!(
        fingerprint.resources.unwrap(),
        vec!["AndroidManifest.xml", "classes.dex", "res/raw/config.bin"]
    );

    let trees = fingerprint.trees.unwrap();
    assert_eq!(trees.hashes, vec!["9b1c2f0e"]);
    assert!(trees.reference.unwrap().contains_key("aa01"));

    let manifest = fingerprint.manifest.unwrap();
    assert_eq!(manifest.contributors, vec!["alpha", "beta", "gamma"]);
    let version = manifest.tag_counts.get("version_code").unwrap();
    assert_eq!((version.min, version.max), (3, 12));
    assert!(manifest.pattern.contains(r#"package="[^"]+?""#));
    assert!(manifest
        .pattern
        .contains(r#"<uses-permission android:name="android.permission.INTERNET"/>"#));
}

#[test]
fn test_family_string_refs_without_filters_keep_library_strings() {
    let apks = load_family();
    let strings = Intersector::new(&apks).intersect_dex_string_refx::<&str>(&[]);
    assert_eq!(strings, vec!["+79991234567", "android:support:fragments", "pdus"]);
}
