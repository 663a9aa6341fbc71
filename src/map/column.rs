//! Column mapping.
//!
//! A column is an attribute on the DataFrame element. The source is encoded
//! canonically in the data-reference fields: plug-in name plus a raw config
//! string (the tag path, the formula expression, or the fixed value - not
//! JSON). Attributes written by the older description encoding
//! (`[Kind] source`) decode through a fallback path; that encoding is never
//! written.

use std::sync::Arc;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{json, Value};
use tracing::debug;

use super::{decode_metadata, to_body};
use crate::client::wire::{WireAttribute, WireNewAttribute};
use crate::client::{
    ApiError, BatchPlan, BatchStep, ErrorKind, PointCatalog, StoreClient, Transport,
};
use crate::config::{Config, ReservedNames};
use crate::core::error::{InvalidName, TagNotFound};
use crate::core::{
    validate_name, validate_value_source, Column, ColumnDraft, ColumnPatch, Metadata, NamingRules,
    Patch, ValueSourceType, WebId,
};
use crate::Result;

const PI_POINT_PLUGIN: &str = "PIPoint";
const FORMULA_PLUGIN: &str = "Formula";

fn legacy_description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(\w+)\]\s+(.+)$").expect("legacy pattern compiles"))
}

/// Canonical source encoding: (data reference plug-in, config string).
fn encode_source(
    kind: ValueSourceType,
    source: Option<&str>,
) -> (Option<String>, Option<String>) {
    let config = source.map(str::to_string);
    match kind {
        ValueSourceType::PiTag => (Some(PI_POINT_PLUGIN.to_string()), config),
        ValueSourceType::Formula => (Some(FORMULA_PLUGIN.to_string()), config),
        ValueSourceType::FixedValue => (None, config),
    }
}

/// Decode a stored source: canonical encoding first, then the legacy
/// description marker.
fn decode_source(attr: &WireAttribute) -> (ValueSourceType, Option<String>) {
    match attr.data_reference_plug_in.as_deref() {
        Some(PI_POINT_PLUGIN) => return (ValueSourceType::PiTag, attr.config_string.clone()),
        Some(FORMULA_PLUGIN) => return (ValueSourceType::Formula, attr.config_string.clone()),
        _ => {}
    }
    if let Some(config) = &attr.config_string {
        return (ValueSourceType::FixedValue, Some(config.clone()));
    }
    if let Some(description) = &attr.description {
        if let Some(caps) = legacy_description_re().captures(description) {
            if let Some(kind) = ValueSourceType::from_legacy_token(&caps[1]) {
                return (kind, Some(caps[2].to_string()));
            }
        }
    }
    (ValueSourceType::FixedValue, None)
}

pub struct ColumnStore<T> {
    client: Arc<StoreClient<T>>,
    naming: NamingRules,
    reserved: ReservedNames,
}

impl<T: Transport> ColumnStore<T> {
    pub fn new(client: Arc<StoreClient<T>>, config: &Config) -> Self {
        Self {
            client,
            naming: config.naming.clone(),
            reserved: config.reserved.clone(),
        }
    }

    /// Create a column on a DataFrame.
    ///
    /// Strict on create: a tag-backed column verifies the tag against the
    /// point catalog before any write. The batch creates the attribute, its
    /// reserved metadata child, sets the metadata value, and reads the
    /// attribute back.
    pub async fn create(&self, frame: &WebId, draft: ColumnDraft) -> Result<Column> {
        validate_name(&draft.name, &self.naming)?;
        validate_value_source(draft.value_source_type, draft.value_source.as_deref())?;
        if draft.value_source_type == ValueSourceType::PiTag {
            if let Some(path) = draft.value_source.as_deref() {
                self.verify_tag(path).await?;
            }
        }

        // Order is the attribute count at creation time; the store preserves
        // insertion order in listings.
        let order = self.client.element_attributes(frame).await?.len();

        let (plug_in, config) = encode_source(draft.value_source_type, draft.value_source.as_deref());
        let mut plan = BatchPlan::new();
        let attr = plan.push(BatchStep::post(
            format!("elements/{frame}/attributes"),
            to_body(&WireNewAttribute {
                name: draft.name.clone(),
                description: None,
                data_reference_plug_in: plug_in,
                config_string: config,
                engineering_unit: draft.engineering_unit.clone(),
            }),
        ));
        let meta_attr = plan.push(BatchStep::post_under(
            attr,
            "/attributes",
            to_body(&WireNewAttribute {
                name: self.reserved.metadata_attribute.clone(),
                ..Default::default()
            }),
        ));
        let set = plan.push(BatchStep::put_under(
            meta_attr,
            "/value",
            json!({ "Value": draft.metadata.encode() }),
        ));
        let terminal = plan.push(BatchStep::read_back(attr).after(&[set]));

        let outcome = self.client.execute_batch(plan).await?;
        let step = outcome.expect_ok(terminal)?;
        let wire: WireAttribute = serde_json::from_value(step.content.clone())
            .map_err(|err| ApiError::decode(format!("attribute read-back decode failed: {err}")))?;

        Ok(Column {
            id: WebId::new(wire.web_id)?,
            name: wire.name,
            value_source_type: draft.value_source_type,
            value_source: draft.value_source,
            engineering_unit: wire.engineering_unit.or(draft.engineering_unit),
            value_type: wire.value_type,
            metadata: draft.metadata,
            order,
        })
    }

    pub async fn get(&self, frame: &WebId, id: &WebId) -> Result<Column> {
        let mut attrs = self.client.element_attributes(frame).await?;
        let Some(order) = attrs.iter().position(|attr| attr.web_id == id.as_str()) else {
            return Err(ApiError {
                kind: ErrorKind::NotFound,
                message: format!("attribute {id} is not a column of element {frame}"),
                status: None,
            }
            .into());
        };
        let wire = attrs.swap_remove(order);
        self.column_from_wire(wire, order).await
    }

    /// Update direct fields with a PATCH and the metadata child with a PUT.
    ///
    /// Permissive on update: a changed source is not re-verified against the
    /// point catalog.
    pub async fn update(&self, id: &WebId, patch: ColumnPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Patch::Set(name) = &patch.name {
            validate_name(name, &self.naming)?;
        }
        if let Patch::Set((kind, source)) = &patch.value_source {
            validate_value_source(*kind, source.as_deref())?;
        }

        let mut body = serde_json::Map::new();
        match &patch.name {
            Patch::Set(name) => {
                body.insert("Name".into(), Value::String(name.clone()));
            }
            Patch::Clear => {
                return Err(InvalidName {
                    raw: String::new(),
                    message: "Name is required".to_string(),
                }
                .into());
            }
            Patch::Keep => {}
        }
        match &patch.value_source {
            Patch::Set((kind, source)) => {
                let (plug_in, config) = encode_source(*kind, source.as_deref());
                body.insert(
                    "DataReferencePlugIn".into(),
                    plug_in.map(Value::String).unwrap_or(Value::Null),
                );
                body.insert(
                    "ConfigString".into(),
                    config.map(Value::String).unwrap_or(Value::Null),
                );
            }
            Patch::Clear => {
                body.insert("DataReferencePlugIn".into(), Value::Null);
                body.insert("ConfigString".into(), Value::Null);
            }
            Patch::Keep => {}
        }
        match &patch.engineering_unit {
            Patch::Set(unit) => {
                body.insert("EngineeringUnit".into(), Value::String(unit.clone()));
            }
            Patch::Clear => {
                body.insert("EngineeringUnit".into(), Value::Null);
            }
            Patch::Keep => {}
        }
        if !body.is_empty() {
            self.client.update_attribute(id, Value::Object(body)).await?;
        }

        match patch.metadata {
            Patch::Set(metadata) => self.write_metadata(id, &metadata).await?,
            Patch::Clear => self.write_metadata(id, &Metadata::new()).await?,
            Patch::Keep => {}
        }
        Ok(())
    }

    pub async fn delete(&self, id: &WebId) -> Result<()> {
        self.client.delete_attribute(id).await?;
        Ok(())
    }

    /// Columns in backend (insertion) order; `order` is the listing index.
    pub async fn list(&self, frame: &WebId) -> Result<Vec<Column>> {
        let attrs = self.client.element_attributes(frame).await?;
        let mut columns = Vec::with_capacity(attrs.len());
        for (order, wire) in attrs.into_iter().enumerate() {
            columns.push(self.column_from_wire(wire, order).await?);
        }
        Ok(columns)
    }

    async fn verify_tag(&self, path: &str) -> Result<()> {
        match self.client.by_path(path).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind == ErrorKind::NotFound => Err(TagNotFound {
                path: path.to_string(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    async fn column_from_wire(&self, wire: WireAttribute, order: usize) -> Result<Column> {
        let id = WebId::new(wire.web_id.clone())?;
        let metadata = self.read_metadata(&id).await;
        let (kind, source) = decode_source(&wire);
        Ok(Column {
            id,
            name: wire.name,
            value_source_type: kind,
            value_source: source,
            engineering_unit: wire.engineering_unit,
            value_type: wire.value_type,
            metadata,
            order,
        })
    }

    async fn read_metadata(&self, id: &WebId) -> Metadata {
        match self.try_read_metadata(id).await {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!("column metadata read failed, using defaults: {err}");
                Metadata::new()
            }
        }
    }

    async fn try_read_metadata(&self, id: &WebId) -> Result<Metadata> {
        let children = self.client.child_attributes(id).await?;
        let Some(found) = children
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(&self.reserved.metadata_attribute))
        else {
            return Ok(Metadata::new());
        };
        let attr_id = WebId::new(found.web_id.clone())?;
        let value = self.client.attribute_value(&attr_id).await?;
        Ok(decode_metadata(&value))
    }

    async fn write_metadata(&self, id: &WebId, metadata: &Metadata) -> Result<()> {
        let children = self.client.child_attributes(id).await?;
        if let Some(found) = children
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(&self.reserved.metadata_attribute))
        {
            let attr_id = WebId::new(found.web_id.clone())?;
            self.client
                .set_attribute_value(&attr_id, Value::String(metadata.encode()))
                .await?;
            return Ok(());
        }
        // The child does not exist yet: create and set as one composite.
        let mut plan = BatchPlan::new();
        let attr = plan.push(BatchStep::post(
            format!("attributes/{id}/attributes"),
            to_body(&WireNewAttribute {
                name: self.reserved.metadata_attribute.clone(),
                ..Default::default()
            }),
        ));
        let set = plan.push(BatchStep::put_under(
            attr,
            "/value",
            json!({ "Value": metadata.encode() }),
        ));
        let terminal = plan.push(BatchStep::read_back(attr).after(&[set]));
        let outcome = self.client.execute_batch(plan).await?;
        outcome.expect_ok(terminal)?;
        Ok(())
    }
}
