//! Label manifests.
//!
//! A manifest is an ordered YAML list of the labels a repository should
//! carry, typically checked into the repository itself:
//!
//! ```yaml
//! - name: bug
//!   description: Something isn't working
//!   color: d73a4a
//! - name: wontfix
//!   color: ffffff
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// A named, styled category on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Unique key within a repository's label set.
    pub name: String,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
    /// Color encoding, six hex digits without a leading `#`. Not validated
    /// here; the remote API rejects values it cannot use.
    #[serde(default)]
    pub color: String,
}

/// Load the ordered list of desired labels from a YAML manifest.
///
/// # Errors
/// Returns [`SyncError::ManifestNotFound`] if the file does not exist and
/// [`SyncError::ManifestParse`] if it is not a valid label list.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<Label>, SyncError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            SyncError::ManifestNotFound(path.to_path_buf())
        } else {
            SyncError::Io(e)
        }
    })?;
    let labels: Vec<Label> = serde_yaml::from_str(&raw)?;
    Ok(labels)
}
