//! Remote label repositories.

pub mod github;
pub mod traits;

pub use traits::LabelStore;
