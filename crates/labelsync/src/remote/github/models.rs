//! Wire types for the GitHub labels API.

use serde::{Deserialize, Serialize};

use crate::manifest::Label;

/// Label resource as returned by the REST v3 API.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelResource {
    /// Label name.
    pub name: String,
    /// Description; null for labels created without one.
    #[serde(default)]
    pub description: Option<String>,
    /// Six-hex-digit color, no leading `#`.
    #[serde(default)]
    pub color: Option<String>,
}

impl From<LabelResource> for Label {
    fn from(resource: LabelResource) -> Self {
        Self {
            name: resource.name,
            description: resource.description.unwrap_or_default(),
            color: resource.color.unwrap_or_default(),
        }
    }
}

/// Body for `POST /repos/{owner}/{repo}/labels`.
#[derive(Debug, Serialize)]
pub struct CreateLabelBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub color: &'a str,
}

/// Body for `PATCH /repos/{owner}/{repo}/labels/{name}`.
///
/// `new_name` equals the addressed name unless the caller is renaming.
#[derive(Debug, Serialize)]
pub struct UpdateLabelBody<'a> {
    pub new_name: &'a str,
    pub description: &'a str,
    pub color: &'a str,
}
