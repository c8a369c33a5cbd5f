//! Port to a remote repository's label collection.

use async_trait::async_trait;

use crate::error::SyncError;
use crate::manifest::Label;

/// Label operations on a single remote repository.
///
/// The reconciler invokes these methods from multiple tasks at once, so
/// implementations must be safe for concurrent use through `&self`.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Return the complete current label set, fully paginated.
    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>, SyncError>;

    /// Create a new label.
    async fn create_label(&self, owner: &str, repo: &str, label: &Label) -> Result<(), SyncError>;

    /// Update the label currently called `name`. `label.name` may differ to
    /// perform a rename, though the diff never produces one.
    async fn update_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        label: &Label,
    ) -> Result<(), SyncError>;

    /// Delete the label called `name`.
    async fn delete_label(&self, owner: &str, repo: &str, name: &str) -> Result<(), SyncError>;
}
