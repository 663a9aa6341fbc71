//! Read-only tag descriptor sourced from the point catalog.

use serde::{Deserialize, Serialize};

use super::identity::WebId;

/// A named time-series data source in the backend's catalog.
///
/// Tags are referenced by columns and surfaced by search; this system never
/// creates or mutates them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: WebId,
    pub name: String,
    pub path: String,
    pub description: Option<String>,
    pub value_type: String,
    pub engineering_unit: Option<String>,
}
