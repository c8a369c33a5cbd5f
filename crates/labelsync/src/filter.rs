//! Exclusion filtering of the current label set.
//!
//! The filter only ever touches the *current* set: an excluded label is out
//! of consideration for update and delete, but a manifest entry with the
//! same name is still a create candidate.

use regex::Regex;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::manifest::Label;

/// Decides whether a label name is excluded from sync consideration.
///
/// Kept as a trait so the concrete pattern engine is swappable without
/// touching the diff logic.
pub trait NameMatcher: Send + Sync {
    fn matches(&self, name: &str) -> bool;
}

/// Regex-backed matcher. Unanchored: the pattern may match anywhere in the
/// label name.
#[derive(Debug)]
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    /// Compile an exclusion pattern.
    ///
    /// # Errors
    /// Returns [`SyncError::Pattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, SyncError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl NameMatcher for RegexMatcher {
    fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Drop current labels whose name matches the exclusion matcher.
///
/// Every label is reported: excluded ones at info level, retained ones at
/// debug level. Order of the retained labels is preserved.
#[must_use]
pub fn exclude_labels(current: Vec<Label>, matcher: &dyn NameMatcher) -> Vec<Label> {
    current
        .into_iter()
        .filter(|label| {
            if matcher.matches(&label.name) {
                info!(label = %label.name, "excluding label from sync");
                false
            } else {
                debug!(label = %label.name, "label retained for sync");
                true
            }
        })
        .collect()
}
