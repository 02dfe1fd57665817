use crate::apk::TagNumbers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Manifest elements whose counts are tracked
pub const TRACKED_TAGS: [&str; 6] = [
    "uses-permission",
    "activity",
    "receiver",
    "service",
    "provider",
    "version_code",
];

/// Observed `[min, max]` count of one manifest element across APKs.
///
/// Starts at the sentinel `[0xFF, 0]` ("no data yet").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCountRange {
    pub min: u64,
    pub max: u64,
    /// Number of APKs that reported this tag
    pub samples: usize,
}

impl TagCountRange {
    pub const SENTINEL_MIN: u64 = 0xFF;
    pub const SENTINEL_MAX: u64 = 0;

    pub fn new() -> Self {
        Self {
            min: Self::SENTINEL_MIN,
            max: Self::SENTINEL_MAX,
            samples: 0,
        }
    }

    /// Clamp the range to include `value`
    pub fn observe(&mut self, value: u64) {
        if self.samples == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.samples += 1;
    }

    /// True while no APK has reported the tag
    pub fn is_unset(&self) -> bool {
        self.samples == 0
    }

    pub fn contains(&self, value: u64) -> bool {
        !self.is_unset() && self.min <= value && value <= self.max
    }
}

impl Default for TagCountRange {
    fn default() -> Self {
        Self::new()
    }
}

/// Count ranges of every tracked manifest element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagCounts {
    ranges: BTreeMap<String, TagCountRange>,
}

impl TagCounts {
    pub fn new() -> Self {
        Self {
            ranges: TRACKED_TAGS
                .iter()
                .map(|tag| (tag.to_string(), TagCountRange::new()))
                .collect(),
        }
    }

    /// Fold one APK's report in. Only reported keys are touched; tags
    /// outside [`TRACKED_TAGS`] are ignored.
    pub fn observe(&mut self, report: &TagNumbers) {
        for (tag, &count) in report {
            match self.ranges.get_mut(tag) {
                Some(range) => range.observe(count),
                None => trace!("Ignoring untracked manifest tag {}", tag),
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&TagCountRange> {
        self.ranges.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagCountRange)> {
        self.ranges.iter().map(|(tag, range)| (tag.as_str(), range))
    }

    /// Tags of `report` whose count falls outside the observed range.
    /// Tags without a range yet are not judged.
    pub fn out_of_range(&self, report: &TagNumbers) -> Vec<String> {
        self.ranges
            .iter()
            .filter(|(_, range)| !range.is_unset())
            .filter_map(|(tag, range)| {
                let count = *report.get(tag)?;
                (!range.contains(count)).then(|| tag.clone())
            })
            .collect()
    }
}

impl Default for TagCounts {
    fn default() -> Self {
        Self::new()
    }
}
