use regex::Regex;
use std::collections::HashSet;

const USES_PERMISSION_PATTERN: &str = r#"uses-permission\s+?.*?:name="([^"]+?)""#;
const PERMISSION_ATTR_PATTERN: &str = r#"android:permission="([^"]+?)""#;
const ACTION_PATTERN: &str = r#"action\s+?.*?:name="([^"]+?)""#;

/// Pulls permission and intent-action names out of manifest text.
///
/// Pure pattern matching: the text may be malformed or obfuscated markup.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    uses_permission: Regex,
    permission_attr: Regex,
    action: Regex,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            uses_permission: compile(USES_PERMISSION_PATTERN),
            permission_attr: compile(PERMISSION_ATTR_PATTERN),
            action: compile(ACTION_PATTERN),
        }
    }

    /// Requested permissions plus permissions guarding components
    pub fn permissions(&self, manifest: &str) -> HashSet<String> {
        let mut perms = captures(&self.uses_permission, manifest);
        perms.extend(captures(&self.permission_attr, manifest));
        perms
    }

    /// Intent-filter action names
    pub fn actions(&self, manifest: &str) -> HashSet<String> {
        captures(&self.action, manifest)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in manifest pattern is valid")
}

fn captures(regex: &Regex, text: &str) -> HashSet<String> {
    regex
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
