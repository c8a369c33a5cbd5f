//! GitHub REST v3 label store.
//!
//! Thin I/O layer: authentication, pagination, and wire types. All sync
//! logic lives in [`crate::reconcile`].

mod client;
mod models;

pub use client::GithubClient;
