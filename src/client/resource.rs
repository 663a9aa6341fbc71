//! Typed calls against the store's element, attribute, and point resources.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::batch::{self, BatchOutcome, BatchPlan};
use super::error::{ApiError, ErrorKind};
use super::transport::{Transport, TransportRequest};
use super::wire::{
    WireAttribute, WireElement, WireItems, WireNewAttribute, WireNewElement, WirePoint, WireValue,
};
use crate::core::{Tag, WebId};

/// One page of point catalog matches.
#[derive(Clone, Debug, Default)]
pub struct PointPage {
    pub tags: Vec<Tag>,
    pub total: Option<usize>,
}

/// Point catalog lookups, the seam the search subsystem and column
/// pre-flight checks consume.
#[async_trait]
pub trait PointCatalog: Send + Sync {
    async fn search_by_name(&self, pattern: &str, max_count: usize) -> Result<PointPage, ApiError>;
    async fn by_path(&self, path: &str) -> Result<Tag, ApiError>;
}

/// Typed client over a [`Transport`].
pub struct StoreClient<T> {
    transport: T,
}

impl<T: Transport> StoreClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    // =========================================================================
    // Elements
    // =========================================================================

    pub async fn element(&self, id: &WebId) -> Result<WireElement, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get(format!("elements/{id}")))
            .await?;
        response.json()
    }

    pub async fn element_by_path(&self, path: &str) -> Result<WireElement, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get("elements").with_query("path", path))
            .await?;
        response.json()
    }

    pub async fn child_elements(&self, id: &WebId) -> Result<Vec<WireElement>, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get(format!("elements/{id}/elements")))
            .await?;
        let page: WireItems<WireElement> = response.json()?;
        Ok(page.items)
    }

    /// Create a child element and return the new element's id, parsed from
    /// the Location header.
    pub async fn create_child_element(
        &self,
        parent: &WebId,
        draft: &WireNewElement,
    ) -> Result<WebId, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::post(
                format!("elements/{parent}/elements"),
                serde_json::to_value(draft)
                    .map_err(|err| ApiError::decode(format!("element encode failed: {err}")))?,
            ))
            .await?;
        created_id(response.location.as_deref())
    }

    pub async fn update_element(&self, id: &WebId, body: Value) -> Result<(), ApiError> {
        self.transport
            .send(TransportRequest::patch(format!("elements/{id}"), body))
            .await?;
        Ok(())
    }

    pub async fn delete_element(&self, id: &WebId) -> Result<(), ApiError> {
        self.transport
            .send(TransportRequest::delete(format!("elements/{id}")))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub async fn attribute(&self, id: &WebId) -> Result<WireAttribute, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get(format!("attributes/{id}")))
            .await?;
        response.json()
    }

    pub async fn element_attributes(&self, element: &WebId) -> Result<Vec<WireAttribute>, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get(format!("elements/{element}/attributes")))
            .await?;
        let page: WireItems<WireAttribute> = response.json()?;
        Ok(page.items)
    }

    pub async fn child_attributes(
        &self,
        attribute: &WebId,
    ) -> Result<Vec<WireAttribute>, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get(format!(
                "attributes/{attribute}/attributes"
            )))
            .await?;
        let page: WireItems<WireAttribute> = response.json()?;
        Ok(page.items)
    }

    pub async fn create_element_attribute(
        &self,
        element: &WebId,
        draft: &WireNewAttribute,
    ) -> Result<WebId, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::post(
                format!("elements/{element}/attributes"),
                serde_json::to_value(draft)
                    .map_err(|err| ApiError::decode(format!("attribute encode failed: {err}")))?,
            ))
            .await?;
        created_id(response.location.as_deref())
    }

    pub async fn create_child_attribute(
        &self,
        attribute: &WebId,
        draft: &WireNewAttribute,
    ) -> Result<WebId, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::post(
                format!("attributes/{attribute}/attributes"),
                serde_json::to_value(draft)
                    .map_err(|err| ApiError::decode(format!("attribute encode failed: {err}")))?,
            ))
            .await?;
        created_id(response.location.as_deref())
    }

    pub async fn update_attribute(&self, id: &WebId, body: Value) -> Result<(), ApiError> {
        self.transport
            .send(TransportRequest::patch(format!("attributes/{id}"), body))
            .await?;
        Ok(())
    }

    pub async fn delete_attribute(&self, id: &WebId) -> Result<(), ApiError> {
        self.transport
            .send(TransportRequest::delete(format!("attributes/{id}")))
            .await?;
        Ok(())
    }

    pub async fn attribute_value(&self, id: &WebId) -> Result<Value, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get(format!("attributes/{id}/value")))
            .await?;
        let envelope: WireValue = response.json()?;
        Ok(envelope.value)
    }

    pub async fn set_attribute_value(&self, id: &WebId, value: Value) -> Result<(), ApiError> {
        self.transport
            .send(TransportRequest::put(
                format!("attributes/{id}/value"),
                json!({ "Value": value }),
            ))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Batch
    // =========================================================================

    pub async fn execute_batch(&self, plan: BatchPlan) -> Result<BatchOutcome, ApiError> {
        batch::execute(&self.transport, plan).await
    }
}

#[async_trait]
impl<T: Transport> PointCatalog for StoreClient<T> {
    async fn search_by_name(&self, pattern: &str, max_count: usize) -> Result<PointPage, ApiError> {
        let response = self
            .transport
            .send(
                TransportRequest::get("points")
                    .with_query("nameFilter", pattern)
                    .with_query("maxCount", max_count.to_string()),
            )
            .await?;
        let page: WireItems<WirePoint> = response.json()?;
        let mut tags = Vec::with_capacity(page.items.len());
        for point in page.items {
            match point.into_tag() {
                Ok(tag) => tags.push(tag),
                // A catalog row without an id is unusable; skip it rather
                // than failing the whole page.
                Err(err) => tracing::debug!("skipping malformed point: {err}"),
            }
        }
        Ok(PointPage {
            tags,
            total: page.total_count,
        })
    }

    async fn by_path(&self, path: &str) -> Result<Tag, ApiError> {
        let response = self
            .transport
            .send(TransportRequest::get("points").with_query("path", path))
            .await?;
        let point: WirePoint = response.json()?;
        point
            .into_tag()
            .map_err(|err| ApiError::new(ErrorKind::Unknown, err.to_string()))
    }
}

/// Parse the created resource's id out of a Location header
/// (`…/elements/{webId}` or `…/attributes/{webId}`).
fn created_id(location: Option<&str>) -> Result<WebId, ApiError> {
    let location = location
        .ok_or_else(|| ApiError::decode("create response carried no Location header"))?;
    let last = location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    WebId::new(last).map_err(|_| {
        ApiError::decode(format!("Location header `{location}` has no resource id"))
    })
}
