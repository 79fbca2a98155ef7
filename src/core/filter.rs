//! Channel filter for frame traffic logging.
//!
//! High-frequency tags (position updates, clock sync and the like) drown the
//! log if every frame is reported. The filter holds the set of tags exempt
//! from informational frame logging; filtered frames still encode and decode
//! normally.
//!
//! The set is shared between the encode and decode paths of a process, so the
//! handle is cheaply cloneable and internally synchronized.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Shared set of frame tags excluded from informational logging.
#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    tags: Arc<RwLock<HashSet<String>>>,
}

impl ChannelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add tags to the exclusion set.
    pub fn ignore<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut set) = self.tags.write() {
            set.extend(tags.into_iter().map(Into::into));
        }
    }

    /// Remove tags from the exclusion set.
    pub fn unignore<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Ok(mut set) = self.tags.write() {
            for tag in tags {
                set.remove(tag.as_ref());
            }
        }
    }

    /// True if `tag` is excluded from informational logging.
    ///
    /// A poisoned lock degrades to "not ignored": the filter only gates log
    /// volume, never correctness.
    pub fn is_ignored(&self, tag: &str) -> bool {
        self.tags
            .read()
            .map(|set| set.contains(tag))
            .unwrap_or(false)
    }

    /// Sorted copy of the current exclusion set.
    pub fn snapshot(&self) -> Vec<String> {
        self.tags
            .read()
            .map(|set| {
                let mut tags: Vec<String> = set.iter().cloned().collect();
                tags.sort();
                tags
            })
            .unwrap_or_default()
    }
}
