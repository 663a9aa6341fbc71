//! Account element resolution.
//!
//! Each user owns one element under the configured root directory, named by
//! a pure derivation from their identity. Resolution is find-or-create;
//! the lookup and the creation batch are not atomic, so true concurrent
//! racers can double-create - the store is the arbiter of that race.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{stored_text, to_body};
use crate::client::wire::{WireElement, WireNewAttribute, WireNewElement};
use crate::client::{ApiError, BatchPlan, BatchStep, ErrorKind, StoreClient, Transport};
use crate::config::{Config, ReservedNames};
use crate::core::error::DecodeError;
use crate::core::{
    normalized_account_name, validate_name, IdentityType, NamingRules, UserElement, UserIdentity,
    WebId,
};
use crate::Result;

/// Who is calling. Implemented by the application shell; faked in tests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> std::result::Result<UserIdentity, ApiError>;
}

/// Resolve the current user, degrading to the anonymous read-only identity
/// on auth failure instead of blocking the application.
pub async fn resolve_identity<P: IdentityProvider>(
    provider: &P,
) -> std::result::Result<UserIdentity, ApiError> {
    match provider.current_user().await {
        Ok(user) => Ok(user),
        Err(err) if err.kind == ErrorKind::Auth => {
            warn!("identity resolution failed ({err}); continuing read-only");
            Ok(UserIdentity::anonymous())
        }
        Err(err) => Err(err),
    }
}

/// Bookkeeping blob stored on the account element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AccountInfo {
    sid: String,
    identity_type: Option<IdentityType>,
    original_name: String,
    created_at_ms: u64,
}

impl AccountInfo {
    fn encode(&self) -> String {
        serde_json::to_string(self).expect("account info serializes")
    }

    fn decode(raw: &str) -> std::result::Result<Self, DecodeError> {
        serde_json::from_str(raw).map_err(|err| DecodeError {
            slot: "account info",
            detail: err.to_string(),
        })
    }
}

pub struct AccountDirectory<T> {
    client: Arc<StoreClient<T>>,
    naming: NamingRules,
    reserved: ReservedNames,
    root: WebId,
}

impl<T: Transport> AccountDirectory<T> {
    pub fn new(client: Arc<StoreClient<T>>, config: &Config, root: WebId) -> Self {
        Self {
            client,
            naming: config.naming.clone(),
            reserved: config.reserved.clone(),
            root,
        }
    }

    /// Resolve the root directory element from its configured path. Owned
    /// by the composition root; there is no cached global.
    pub async fn resolve_root(client: &StoreClient<T>, config: &Config) -> Result<WebId> {
        let element = client.element_by_path(&config.connection.root_path).await?;
        Ok(WebId::new(element.web_id)?)
    }

    /// Find the account element for an identity, creating it on first use.
    ///
    /// Idempotent: the derived name is deterministic and the lookup is an
    /// exact case-insensitive match, so a second call finds the element the
    /// first one created.
    pub async fn get_or_create(&self, identity: &UserIdentity) -> Result<UserElement> {
        if !identity.authenticated {
            return Err(ApiError::new(
                ErrorKind::Auth,
                "anonymous users have no account element",
            )
            .into());
        }
        let normalized = normalized_account_name(&identity.name, &self.naming);
        validate_name(&normalized, &self.naming)?;

        let children = self.client.child_elements(&self.root).await?;
        if let Some(found) = children
            .into_iter()
            .find(|child| child.name.eq_ignore_ascii_case(&normalized))
        {
            let id = WebId::new(found.web_id)?;
            return Ok(self.read_account(id, found.name, identity).await);
        }
        self.create_account(&normalized, identity).await
    }

    async fn read_account(
        &self,
        id: WebId,
        normalized_name: String,
        identity: &UserIdentity,
    ) -> UserElement {
        let info = match self.try_read_info(&id).await {
            Ok(Some(info)) => info,
            Ok(None) => AccountInfo::default(),
            Err(err) => {
                debug!("account info read failed, deriving from identity: {err}");
                AccountInfo::default()
            }
        };
        UserElement {
            web_id: id,
            normalized_name,
            sid: if info.sid.is_empty() {
                identity.sid_string()
            } else {
                info.sid
            },
            identity_type: info.identity_type.unwrap_or(identity.identity_type),
            original_name: if info.original_name.is_empty() {
                identity.name.clone()
            } else {
                info.original_name
            },
            created_at_ms: info.created_at_ms,
        }
    }

    async fn try_read_info(&self, id: &WebId) -> Result<Option<AccountInfo>> {
        let attrs = self.client.element_attributes(id).await?;
        let Some(found) = attrs
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(&self.reserved.metadata_attribute))
        else {
            return Ok(None);
        };
        let attr_id = WebId::new(found.web_id.clone())?;
        let value = self.client.attribute_value(&attr_id).await?;
        match stored_text(&value).map(AccountInfo::decode) {
            Some(Ok(info)) => Ok(Some(info)),
            Some(Err(err)) => {
                debug!("stored account info ignored: {err}");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn create_account(
        &self,
        normalized: &str,
        identity: &UserIdentity,
    ) -> Result<UserElement> {
        let info = AccountInfo {
            sid: identity.sid_string(),
            identity_type: Some(identity.identity_type),
            original_name: identity.name.clone(),
            created_at_ms: unix_millis(),
        };

        let mut plan = BatchPlan::new();
        let account = plan.push(BatchStep::post(
            format!("elements/{}/elements", self.root),
            to_body(&WireNewElement {
                name: normalized.to_string(),
                description: Some(identity.name.clone()),
            }),
        ));
        let attr = plan.push(BatchStep::post_under(
            account,
            "/attributes",
            to_body(&WireNewAttribute {
                name: self.reserved.metadata_attribute.clone(),
                ..Default::default()
            }),
        ));
        let set = plan.push(BatchStep::put_under(
            attr,
            "/value",
            json!({ "Value": info.encode() }),
        ));
        let terminal = plan.push(BatchStep::read_back(account).after(&[set]));

        let outcome = self.client.execute_batch(plan).await?;
        let step = outcome.expect_ok(terminal)?;
        let element: WireElement = serde_json::from_value(step.content.clone())
            .map_err(|err| ApiError::decode(format!("account read-back decode failed: {err}")))?;

        Ok(UserElement {
            web_id: WebId::new(element.web_id)?,
            normalized_name: element.name,
            sid: info.sid,
            identity_type: identity.identity_type,
            original_name: info.original_name,
            created_at_ms: info.created_at_ms,
        })
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
