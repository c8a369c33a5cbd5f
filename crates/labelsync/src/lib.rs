//! Declarative GitHub label reconciliation.
//!
//! This crate converges the labels of a remote repository onto a
//! version-controlled YAML manifest: labels present only in the manifest are
//! created, labels whose description or color drifted are updated, and
//! labels present only on the remote are deleted when pruning is enabled.
//! An exclusion pattern can shield existing labels from the sync entirely.
//!
//! # Example
//!
//! ```rust,ignore
//! use labelsync::{load_manifest, GithubClient, SyncOptions, Syncer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let desired = load_manifest(".github/labels.yml")?;
//!     let syncer = Syncer::new(GithubClient::new("token")?);
//!
//!     let opts = SyncOptions {
//!         prune: true,
//!         exclude_pattern: Some("^release-".to_string()),
//!         dry_run: false,
//!     };
//!     syncer.sync("acme", "widgets", &desired, &opts).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod filter;
pub mod manifest;
pub mod reconcile;
pub mod remote;

pub use error::SyncError;
pub use filter::{NameMatcher, RegexMatcher};
pub use manifest::{load_manifest, Label};
pub use reconcile::{Action, Plan, SyncOptions, Syncer};
pub use remote::github::GithubClient;
pub use remote::LabelStore;
