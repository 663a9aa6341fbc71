//! DataFrame mapping.
//!
//! A DataFrame is an element. Its permissions and metadata live on
//! attributes of a reserved bookkeeping child element, keeping user-facing
//! listings clean. Creation is a single composite batch; bookkeeping reads
//! are best-effort with documented defaults.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::{decode_metadata, decode_permissions, to_body};
use crate::client::wire::{WireElement, WireNewAttribute, WireNewElement};
use crate::client::{ApiError, BatchPlan, BatchStep, StoreClient, Transport};
use crate::config::{Config, ReservedNames};
use crate::core::error::InvalidName;
use crate::core::{
    validate_name, DataFrame, DataFrameDraft, DataFramePatch, DataFrameSummary, Metadata,
    NamingRules, Patch, Permissions, WebId,
};
use crate::Result;

pub struct DataFrameStore<T> {
    client: Arc<StoreClient<T>>,
    naming: NamingRules,
    reserved: ReservedNames,
}

impl<T: Transport> DataFrameStore<T> {
    pub fn new(client: Arc<StoreClient<T>>, config: &Config) -> Self {
        Self {
            client,
            naming: config.naming.clone(),
            reserved: config.reserved.clone(),
        }
    }

    /// Create a DataFrame under an owner element.
    ///
    /// One composite batch: element, bookkeeping child, permissions
    /// attribute and value, optional metadata attribute and value, then the
    /// terminal read-back of the element.
    pub async fn create(&self, owner: &WebId, draft: DataFrameDraft) -> Result<DataFrame> {
        validate_name(&draft.name, &self.naming)?;
        let reserved_keys = draft.metadata.reserved_keys();
        if !reserved_keys.is_empty() {
            debug!(?reserved_keys, "metadata carries reserved keys");
        }

        let name = self.display_name(&draft.name);
        let mut plan = BatchPlan::new();
        let frame = plan.push(BatchStep::post(
            format!("elements/{owner}/elements"),
            to_body(&WireNewElement {
                name: name.clone(),
                description: draft.description.clone(),
            }),
        ));
        let child = plan.push(BatchStep::post_under(
            frame,
            "/elements",
            to_body(&WireNewElement {
                name: self.reserved.bookkeeping_element.clone(),
                description: None,
            }),
        ));
        let perms_attr = plan.push(BatchStep::post_under(
            child,
            "/attributes",
            to_body(&WireNewAttribute {
                name: self.reserved.permissions_attribute.clone(),
                ..Default::default()
            }),
        ));
        let mut last = plan.push(BatchStep::put_under(
            perms_attr,
            "/value",
            json!({ "Value": draft.permissions.encode() }),
        ));
        if !draft.metadata.is_empty() {
            let meta_attr = plan.push(BatchStep::post_under(
                child,
                "/attributes",
                to_body(&WireNewAttribute {
                    name: self.reserved.metadata_attribute.clone(),
                    ..Default::default()
                }),
            ));
            last = plan.push(BatchStep::put_under(
                meta_attr,
                "/value",
                json!({ "Value": draft.metadata.encode() }),
            ));
        }
        let terminal = plan.push(BatchStep::read_back(frame).after(&[last]));

        let outcome = self.client.execute_batch(plan).await?;
        let step = outcome.expect_ok(terminal)?;
        let element: WireElement = serde_json::from_value(step.content.clone())
            .map_err(|err| ApiError::decode(format!("element read-back decode failed: {err}")))?;

        Ok(DataFrame {
            id: WebId::new(element.web_id)?,
            name: element.name,
            description: element.description,
            permissions: draft.permissions,
            metadata: draft.metadata,
        })
    }

    pub async fn get(&self, id: &WebId) -> Result<DataFrame> {
        let element = self.client.element(id).await?;
        let (permissions, metadata) = self.read_bookkeeping(id).await;
        Ok(DataFrame {
            id: WebId::new(element.web_id)?,
            name: element.name,
            description: element.description,
            permissions,
            metadata,
        })
    }

    /// Update direct fields with a PATCH; route permissions and metadata
    /// through the bookkeeping child, creating slots on demand.
    ///
    /// The two-call resolve-or-create is not atomic; the store arbitrates
    /// concurrent racers (last write wins on the value).
    pub async fn update(&self, id: &WebId, patch: DataFramePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Patch::Set(name) = &patch.name {
            validate_name(name, &self.naming)?;
        }

        let mut body = serde_json::Map::new();
        match &patch.name {
            Patch::Set(name) => {
                body.insert("Name".into(), Value::String(self.display_name(name)));
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
        match &patch.description {
            Patch::Set(description) => {
                body.insert("Description".into(), Value::String(description.clone()));
            }
            Patch::Clear => {
                body.insert("Description".into(), Value::Null);
            }
            Patch::Keep => {}
        }
        if !body.is_empty() {
            self.client.update_element(id, Value::Object(body)).await?;
        }

        if !patch.permissions.is_keep() || !patch.metadata.is_keep() {
            let child = self.ensure_bookkeeping_child(id).await?;
            match patch.permissions {
                Patch::Set(next) => self.write_permissions(&child, next).await?,
                Patch::Clear => self.write_permissions(&child, Permissions::unset()).await?,
                Patch::Keep => {}
            }
            match patch.metadata {
                Patch::Set(metadata) => self.write_metadata(&child, &metadata).await?,
                Patch::Clear => self.write_metadata(&child, &Metadata::new()).await?,
                Patch::Keep => {}
            }
        }
        Ok(())
    }

    /// Hard delete; the store's native cascade removes columns and the
    /// bookkeeping child.
    pub async fn delete(&self, id: &WebId) -> Result<()> {
        self.client.delete_element(id).await?;
        Ok(())
    }

    /// Children of the owner element, in backend order.
    pub async fn list(&self, owner: &WebId) -> Result<Vec<DataFrameSummary>> {
        let children = self.client.child_elements(owner).await?;
        let mut frames = Vec::with_capacity(children.len());
        for element in children {
            let Ok(id) = WebId::new(element.web_id) else {
                continue;
            };
            frames.push(DataFrameSummary {
                id,
                name: element.name,
                description: element.description,
            });
        }
        Ok(frames)
    }

    fn display_name(&self, name: &str) -> String {
        if self.naming.uppercase {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }

    async fn read_bookkeeping(&self, id: &WebId) -> (Permissions, Metadata) {
        match self.try_read_bookkeeping(id).await {
            Ok(pair) => pair,
            Err(err) => {
                debug!("bookkeeping read failed, using defaults: {err}");
                (Permissions::unset(), Metadata::new())
            }
        }
    }

    async fn try_read_bookkeeping(&self, id: &WebId) -> Result<(Permissions, Metadata)> {
        let mut permissions = Permissions::unset();
        let mut metadata = Metadata::new();
        let Some(child) = self.find_bookkeeping_child(id).await? else {
            return Ok((permissions, metadata));
        };
        let attrs = self.client.element_attributes(&child).await?;
        for attr in &attrs {
            let Ok(attr_id) = WebId::new(attr.web_id.clone()) else {
                continue;
            };
            if attr.name.eq_ignore_ascii_case(&self.reserved.permissions_attribute) {
                if let Ok(value) = self.client.attribute_value(&attr_id).await {
                    permissions = decode_permissions(&value);
                }
            } else if attr.name.eq_ignore_ascii_case(&self.reserved.metadata_attribute) {
                if let Ok(value) = self.client.attribute_value(&attr_id).await {
                    metadata = decode_metadata(&value);
                }
            }
        }
        Ok((permissions, metadata))
    }

    async fn find_bookkeeping_child(&self, id: &WebId) -> Result<Option<WebId>> {
        let children = self.client.child_elements(id).await?;
        for child in children {
            if child.name.eq_ignore_ascii_case(&self.reserved.bookkeeping_element) {
                return Ok(WebId::new(child.web_id).ok());
            }
        }
        Ok(None)
    }

    async fn ensure_bookkeeping_child(&self, id: &WebId) -> Result<WebId> {
        if let Some(child) = self.find_bookkeeping_child(id).await? {
            return Ok(child);
        }
        let child = self
            .client
            .create_child_element(
                id,
                &WireNewElement {
                    name: self.reserved.bookkeeping_element.clone(),
                    description: None,
                },
            )
            .await?;
        Ok(child)
    }

    async fn ensure_attribute(&self, element: &WebId, name: &str) -> Result<WebId> {
        let attrs = self.client.element_attributes(element).await?;
        if let Some(attr) = attrs
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
        {
            return Ok(WebId::new(attr.web_id.clone())?);
        }
        let attr = self
            .client
            .create_element_attribute(
                element,
                &WireNewAttribute {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .await?;
        Ok(attr)
    }

    /// Write a permissions descriptor, preserving the stored owner sid.
    async fn write_permissions(&self, child: &WebId, mut next: Permissions) -> Result<()> {
        let attr = self
            .ensure_attribute(child, &self.reserved.permissions_attribute)
            .await?;
        let stored_owner = match self.client.attribute_value(&attr).await {
            Ok(value) => {
                let current = decode_permissions(&value);
                (!current.owner_sid.is_empty()).then_some(current.owner_sid)
            }
            Err(_) => None,
        };
        if let Some(owner) = stored_owner {
            next.owner_sid = owner;
        }
        self.client
            .set_attribute_value(&attr, Value::String(next.encode()))
            .await?;
        Ok(())
    }

    async fn write_metadata(&self, child: &WebId, metadata: &Metadata) -> Result<()> {
        let attr = self
            .ensure_attribute(child, &self.reserved.metadata_attribute)
            .await?;
        self.client
            .set_attribute_value(&attr, Value::String(metadata.encode()))
            .await?;
        Ok(())
    }
}
