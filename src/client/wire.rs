//! Backend wire schemas.
//!
//! The store speaks PascalCase; the shapes here are the truthful boundary
//! and never leak above the client/map layers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{CoreError, Tag, WebId};

/// An element as the store returns it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireElement {
    pub web_id: String,
    pub name: String,
    pub description: Option<String>,
    pub path: Option<String>,
}

/// Body for element creation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireNewElement {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An attribute as the store returns it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireAttribute {
    pub web_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Value type inferred by the backend; read-only for clients.
    #[serde(rename = "Type")]
    pub value_type: Option<String>,
    pub data_reference_plug_in: Option<String>,
    pub config_string: Option<String>,
    pub engineering_unit: Option<String>,
}

/// Body for attribute creation.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireNewAttribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_reference_plug_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineering_unit: Option<String>,
}

/// A point catalog entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WirePoint {
    pub web_id: String,
    pub name: String,
    pub path: String,
    pub descriptor: Option<String>,
    pub point_type: Option<String>,
    pub engineering_units: Option<String>,
}

impl WirePoint {
    pub fn into_tag(self) -> Result<Tag, CoreError> {
        Ok(Tag {
            id: WebId::new(self.web_id)?,
            name: self.name,
            path: self.path,
            description: self.descriptor.filter(|s| !s.is_empty()),
            value_type: self.point_type.unwrap_or_default(),
            engineering_unit: self.engineering_units.filter(|s| !s.is_empty()),
        })
    }
}

/// An attribute value envelope (`GET/PUT …/value`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireValue {
    pub value: Value,
}

/// A paged listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireItems<T> {
    pub items: Vec<T>,
    pub total_count: Option<usize>,
}

impl<T> Default for WireItems<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: None,
        }
    }
}
