//! Shared test world: an in-memory hierarchical store speaking the
//! transport seam (elements, attributes, points, composite batches) and a
//! scriptable point catalog for driving the search engine.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use framestore::client::{
    ApiError, BatchStep, Method, PointCatalog, PointPage, StepResponse, StoreClient, Transport,
    TransportRequest, TransportResponse,
};
use framestore::core::{Tag, UserIdentity, WebId};
use framestore::{Config, IdentityProvider, Sid};

// =============================================================================
// FakeStore - in-memory element/attribute/point hierarchy
// =============================================================================

#[derive(Clone, Debug)]
struct ElementNode {
    name: String,
    description: Option<String>,
    children: Vec<String>,
    attributes: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttributeOwner {
    Element,
    Attribute,
}

#[derive(Clone, Debug)]
struct AttributeNode {
    name: String,
    description: Option<String>,
    value_type: Option<String>,
    plug_in: Option<String>,
    config: Option<String>,
    engineering_unit: Option<String>,
    value: Value,
    children: Vec<String>,
    owner: (AttributeOwner, String),
}

#[derive(Clone, Debug)]
struct PointNode {
    id: String,
    name: String,
    path: String,
    point_type: String,
}

#[derive(Default)]
struct StoreState {
    elements: BTreeMap<String, ElementNode>,
    attributes: BTreeMap<String, AttributeNode>,
    points: Vec<PointNode>,
    paths: BTreeMap<String, String>,
}

struct StoreInner {
    state: Mutex<StoreState>,
    next_id: AtomicU64,
    calls: AtomicUsize,
    point_searches: AtomicUsize,
    point_lookups: AtomicUsize,
}

/// Clonable handle onto one shared in-memory store.
#[derive(Clone)]
pub struct FakeStore {
    inner: Arc<StoreInner>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState::default()),
                next_id: AtomicU64::new(1),
                calls: AtomicUsize::new(0),
                point_searches: AtomicUsize::new(0),
                point_lookups: AtomicUsize::new(0),
            }),
        }
    }

    /// Total transport calls observed.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Point catalog search calls observed.
    pub fn point_searches(&self) -> usize {
        self.inner.point_searches.load(Ordering::SeqCst)
    }

    /// Point catalog by-path lookups observed.
    pub fn point_lookups(&self) -> usize {
        self.inner.point_lookups.load(Ordering::SeqCst)
    }

    pub fn element_count(&self) -> usize {
        self.state().elements.len()
    }

    /// Create a root element addressable by path.
    pub fn add_root(&self, path: &str, name: &str) -> String {
        let id = self.next_id("E");
        let mut state = self.state();
        state.elements.insert(
            id.clone(),
            ElementNode {
                name: name.to_string(),
                description: None,
                children: Vec::new(),
                attributes: Vec::new(),
            },
        );
        state.paths.insert(path.to_string(), id.clone());
        id
    }

    pub fn seed_point(&self, name: &str, path: &str) {
        let id = self.next_id("P");
        self.state().points.push(PointNode {
            id,
            name: name.to_string(),
            path: path.to_string(),
            point_type: "Float64".to_string(),
        });
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.inner.state.lock().expect("store state lock")
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.inner.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn route(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<TransportResponse, ApiError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method, segments.as_slice()) {
            (Method::Post, ["batch"]) => self.run_batch(body),

            (Method::Get, ["elements"]) => {
                let path = query_value(query, "path")
                    .ok_or_else(|| ApiError::from_status(400, "missing path"))?;
                let state = self.state();
                let id = state
                    .paths
                    .get(path)
                    .ok_or_else(|| ApiError::from_status(404, format!("no element at {path}")))?;
                Ok(ok_json(element_json(id, &state.elements[id])))
            }
            (Method::Get, ["elements", id]) => {
                let state = self.state();
                let node = get_element(&state, id)?;
                Ok(ok_json(element_json(id, node)))
            }
            (Method::Patch, ["elements", id]) => {
                let patch = body.cloned().unwrap_or(Value::Null);
                let mut state = self.state();
                let node = state
                    .elements
                    .get_mut(*id)
                    .ok_or_else(|| ApiError::from_status(404, format!("no element {id}")))?;
                apply_name_description(&mut node.name, &mut node.description, &patch);
                Ok(no_content())
            }
            (Method::Delete, ["elements", id]) => {
                let mut state = self.state();
                if !state.elements.contains_key(*id) {
                    return Err(ApiError::from_status(404, format!("no element {id}")));
                }
                delete_element_cascade(&mut state, id);
                Ok(no_content())
            }
            (Method::Get, ["elements", id, "elements"]) => {
                let state = self.state();
                let node = get_element(&state, id)?;
                let items: Vec<Value> = node
                    .children
                    .iter()
                    .map(|child| element_json(child, &state.elements[child]))
                    .collect();
                Ok(ok_json(items_json(items)))
            }
            (Method::Post, ["elements", id, "elements"]) => self.create_element(id, body),
            (Method::Get, ["elements", id, "attributes"]) => {
                let state = self.state();
                let node = get_element(&state, id)?;
                let items: Vec<Value> = node
                    .attributes
                    .iter()
                    .map(|attr| attribute_json(attr, &state.attributes[attr]))
                    .collect();
                Ok(ok_json(items_json(items)))
            }
            (Method::Post, ["elements", id, "attributes"]) => {
                self.create_attribute(AttributeOwner::Element, id, body)
            }

            (Method::Get, ["attributes", id]) => {
                let state = self.state();
                let node = get_attribute(&state, id)?;
                Ok(ok_json(attribute_json(id, node)))
            }
            (Method::Patch, ["attributes", id]) => {
                let patch = body.cloned().unwrap_or(Value::Null);
                let mut state = self.state();
                let node = state
                    .attributes
                    .get_mut(*id)
                    .ok_or_else(|| ApiError::from_status(404, format!("no attribute {id}")))?;
                apply_name_description(&mut node.name, &mut node.description, &patch);
                apply_attribute_patch(node, &patch);
                Ok(no_content())
            }
            (Method::Delete, ["attributes", id]) => {
                let mut state = self.state();
                if !state.attributes.contains_key(*id) {
                    return Err(ApiError::from_status(404, format!("no attribute {id}")));
                }
                delete_attribute_cascade(&mut state, id);
                Ok(no_content())
            }
            (Method::Get, ["attributes", id, "attributes"]) => {
                let state = self.state();
                let node = get_attribute(&state, id)?;
                let items: Vec<Value> = node
                    .children
                    .iter()
                    .map(|child| attribute_json(child, &state.attributes[child]))
                    .collect();
                Ok(ok_json(items_json(items)))
            }
            (Method::Post, ["attributes", id, "attributes"]) => {
                self.create_attribute(AttributeOwner::Attribute, id, body)
            }
            (Method::Get, ["attributes", id, "value"]) => {
                let state = self.state();
                let node = get_attribute(&state, id)?;
                Ok(ok_json(json!({ "Value": node.value })))
            }
            (Method::Put, ["attributes", id, "value"]) => {
                let value = body
                    .and_then(|b| b.get("Value"))
                    .cloned()
                    .unwrap_or(Value::Null);
                let mut state = self.state();
                let node = state
                    .attributes
                    .get_mut(*id)
                    .ok_or_else(|| ApiError::from_status(404, format!("no attribute {id}")))?;
                node.value = value;
                Ok(no_content())
            }

            (Method::Get, ["points"]) => self.points(query),

            _ => Err(ApiError::from_status(
                404,
                format!("{} {path} is not routable", method.as_str()),
            )),
        }
    }

    fn create_element(
        &self,
        parent: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, ApiError> {
        let body = body.ok_or_else(|| ApiError::from_status(400, "missing body"))?;
        let name = body
            .get("Name")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::from_status(400, "missing Name"))?
            .to_string();
        let description = body
            .get("Description")
            .and_then(Value::as_str)
            .map(str::to_string);

        let id = self.next_id("E");
        let mut state = self.state();
        let parent_node = state
            .elements
            .get(parent)
            .ok_or_else(|| ApiError::from_status(404, format!("no element {parent}")))?;
        let conflict = parent_node.children.iter().any(|child| {
            state.elements[child]
                .name
                .eq_ignore_ascii_case(&name)
        });
        if conflict {
            return Err(ApiError::from_status(
                409,
                format!("element `{name}` already exists under {parent}"),
            ));
        }
        state.elements.insert(
            id.clone(),
            ElementNode {
                name,
                description,
                children: Vec::new(),
                attributes: Vec::new(),
            },
        );
        state
            .elements
            .get_mut(parent)
            .expect("parent just read")
            .children
            .push(id.clone());
        Ok(created(format!("elements/{id}")))
    }

    fn create_attribute(
        &self,
        owner_kind: AttributeOwner,
        owner: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, ApiError> {
        let body = body.ok_or_else(|| ApiError::from_status(400, "missing body"))?;
        let name = body
            .get("Name")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::from_status(400, "missing Name"))?
            .to_string();

        let id = self.next_id("A");
        let mut state = self.state();
        let siblings = match owner_kind {
            AttributeOwner::Element => {
                &state
                    .elements
                    .get(owner)
                    .ok_or_else(|| ApiError::from_status(404, format!("no element {owner}")))?
                    .attributes
            }
            AttributeOwner::Attribute => {
                &state
                    .attributes
                    .get(owner)
                    .ok_or_else(|| ApiError::from_status(404, format!("no attribute {owner}")))?
                    .children
            }
        };
        let conflict = siblings
            .iter()
            .any(|attr| state.attributes[attr].name.eq_ignore_ascii_case(&name));
        if conflict {
            return Err(ApiError::from_status(
                409,
                format!("attribute `{name}` already exists under {owner}"),
            ));
        }

        let node = AttributeNode {
            name,
            description: body
                .get("Description")
                .and_then(Value::as_str)
                .map(str::to_string),
            value_type: None,
            plug_in: body
                .get("DataReferencePlugIn")
                .and_then(Value::as_str)
                .map(str::to_string),
            config: body
                .get("ConfigString")
                .and_then(Value::as_str)
                .map(str::to_string),
            engineering_unit: body
                .get("EngineeringUnit")
                .and_then(Value::as_str)
                .map(str::to_string),
            value: Value::Null,
            children: Vec::new(),
            owner: (owner_kind, owner.to_string()),
        };
        state.attributes.insert(id.clone(), node);
        match owner_kind {
            AttributeOwner::Element => state
                .elements
                .get_mut(owner)
                .expect("owner just read")
                .attributes
                .push(id.clone()),
            AttributeOwner::Attribute => state
                .attributes
                .get_mut(owner)
                .expect("owner just read")
                .children
                .push(id.clone()),
        }
        Ok(created(format!("attributes/{id}")))
    }

    fn points(&self, query: &[(String, String)]) -> Result<TransportResponse, ApiError> {
        if let Some(path) = query_value(query, "path") {
            self.inner.point_lookups.fetch_add(1, Ordering::SeqCst);
            let state = self.state();
            let found = state
                .points
                .iter()
                .find(|point| point.path.eq_ignore_ascii_case(path))
                .ok_or_else(|| ApiError::from_status(404, format!("no point at {path}")))?;
            return Ok(ok_json(point_json(found)));
        }
        let pattern = query_value(query, "nameFilter").unwrap_or("");
        let max_count: usize = query_value(query, "maxCount")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(10);
        self.inner.point_searches.fetch_add(1, Ordering::SeqCst);
        let needle = pattern.trim_matches('*').to_lowercase();
        let state = self.state();
        let matches: Vec<&PointNode> = state
            .points
            .iter()
            .filter(|point| point.name.to_lowercase().contains(&needle))
            .collect();
        let total = matches.len();
        let items: Vec<Value> = matches.into_iter().take(max_count).map(point_json).collect();
        Ok(ok_json(json!({ "Items": items, "TotalCount": total })))
    }

    /// Execute a composite request: steps in key order, Location chaining
    /// resolved here the way the real store resolves it server-side.
    fn run_batch(&self, body: Option<&Value>) -> Result<TransportResponse, ApiError> {
        let body = body.ok_or_else(|| ApiError::from_status(400, "missing batch body"))?;
        let steps: BTreeMap<String, BatchStep> = serde_json::from_value(body.clone())
            .map_err(|err| ApiError::from_status(400, format!("bad batch: {err}")))?;

        let mut keys: Vec<String> = steps.keys().cloned().collect();
        keys.sort_by_key(|key| key.parse::<u32>().unwrap_or(u32::MAX));

        let mut responses: BTreeMap<String, StepResponse> = BTreeMap::new();
        for key in keys {
            let step = &steps[&key];

            let failed_parent = step.parent_ids.iter().any(|parent| {
                responses
                    .get(parent)
                    .map(|resp| !(200..300).contains(&resp.status))
                    .unwrap_or(true)
            });
            if failed_parent {
                responses.insert(
                    key,
                    StepResponse {
                        status: 424,
                        headers: BTreeMap::new(),
                        content: json!({"Message": "dependency failed"}),
                    },
                );
                continue;
            }

            let mut resource = step.resource.clone();
            let mut substitution_failed = false;
            for (index, parameter) in step.parameters.iter().enumerate() {
                match resolve_parameter(parameter, &responses) {
                    Some(value) => {
                        resource = resource.replace(&format!("{{{index}}}"), &value);
                    }
                    None => {
                        substitution_failed = true;
                        break;
                    }
                }
            }
            if substitution_failed {
                responses.insert(
                    key,
                    StepResponse {
                        status: 400,
                        headers: BTreeMap::new(),
                        content: json!({"Message": "unresolvable parameter"}),
                    },
                );
                continue;
            }

            let outcome = self.route(step.method, &resource, &[], step.content.as_ref());
            let response = match outcome {
                Ok(resp) => {
                    let mut headers = BTreeMap::new();
                    if let Some(location) = resp.location {
                        headers.insert("Location".to_string(), location);
                    }
                    StepResponse {
                        status: resp.status,
                        headers,
                        content: resp.body,
                    }
                }
                Err(err) => StepResponse {
                    status: err.status.unwrap_or(500),
                    headers: BTreeMap::new(),
                    content: json!({"Message": err.message}),
                },
            };
            responses.insert(key, response);
        }

        let body = serde_json::to_value(&responses)
            .map_err(|err| ApiError::from_status(500, err.to_string()))?;
        Ok(ok_json(body))
    }
}

#[async_trait]
impl Transport for FakeStore {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, ApiError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.route(req.method, &req.path, &req.query, req.body.as_ref())
    }
}

fn resolve_parameter(
    parameter: &str,
    responses: &BTreeMap<String, StepResponse>,
) -> Option<String> {
    let key = parameter
        .strip_prefix("$.")?
        .strip_suffix(".Headers.Location")?;
    responses.get(key)?.headers.get("Location").cloned()
}

fn get_element<'a>(
    state: &'a StoreState,
    id: &str,
) -> Result<&'a ElementNode, ApiError> {
    state
        .elements
        .get(id)
        .ok_or_else(|| ApiError::from_status(404, format!("no element {id}")))
}

fn get_attribute<'a>(
    state: &'a StoreState,
    id: &str,
) -> Result<&'a AttributeNode, ApiError> {
    state
        .attributes
        .get(id)
        .ok_or_else(|| ApiError::from_status(404, format!("no attribute {id}")))
}

fn delete_element_cascade(state: &mut StoreState, id: &str) {
    let Some(node) = state.elements.remove(id) else {
        return;
    };
    for child in node.children {
        delete_element_cascade(state, &child);
    }
    for attr in node.attributes {
        delete_attribute_cascade(state, &attr);
    }
    for children in state.elements.values_mut() {
        children.children.retain(|child| child.as_str() != id);
    }
    state.paths.retain(|_, mapped| mapped.as_str() != id);
}

fn delete_attribute_cascade(state: &mut StoreState, id: &str) {
    let Some(node) = state.attributes.remove(id) else {
        return;
    };
    for child in node.children {
        delete_attribute_cascade(state, &child);
    }
    match node.owner {
        (AttributeOwner::Element, owner) => {
            if let Some(element) = state.elements.get_mut(&owner) {
                element.attributes.retain(|attr| attr.as_str() != id);
            }
        }
        (AttributeOwner::Attribute, owner) => {
            if let Some(attribute) = state.attributes.get_mut(&owner) {
                attribute.children.retain(|attr| attr.as_str() != id);
            }
        }
    }
}

fn apply_name_description(name: &mut String, description: &mut Option<String>, patch: &Value) {
    if let Some(new_name) = patch.get("Name").and_then(Value::as_str) {
        *name = new_name.to_string();
    }
    if let Some(field) = patch.get("Description") {
        *description = field.as_str().map(str::to_string);
    }
}

fn apply_attribute_patch(node: &mut AttributeNode, patch: &Value) {
    if let Some(field) = patch.get("DataReferencePlugIn") {
        node.plug_in = field.as_str().map(str::to_string);
    }
    if let Some(field) = patch.get("ConfigString") {
        node.config = field.as_str().map(str::to_string);
    }
    if let Some(field) = patch.get("EngineeringUnit") {
        node.engineering_unit = field.as_str().map(str::to_string);
    }
}

fn element_json(id: &str, node: &ElementNode) -> Value {
    json!({
        "WebId": id,
        "Name": node.name,
        "Description": node.description,
    })
}

fn attribute_json(id: &str, node: &AttributeNode) -> Value {
    json!({
        "WebId": id,
        "Name": node.name,
        "Description": node.description,
        "Type": node.value_type,
        "DataReferencePlugIn": node.plug_in,
        "ConfigString": node.config,
        "EngineeringUnit": node.engineering_unit,
    })
}

fn point_json(node: &PointNode) -> Value {
    json!({
        "WebId": node.id,
        "Name": node.name,
        "Path": node.path,
        "PointType": node.point_type,
    })
}

fn items_json(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({ "Items": items, "TotalCount": total })
}

fn ok_json(body: Value) -> TransportResponse {
    TransportResponse {
        status: 200,
        location: None,
        body,
    }
}

fn no_content() -> TransportResponse {
    TransportResponse {
        status: 204,
        location: None,
        body: Value::Null,
    }
}

fn created(location: String) -> TransportResponse {
    TransportResponse {
        status: 201,
        location: Some(location),
        body: Value::Null,
    }
}

fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k.as_str() == key)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// World - wired-up client over a fresh store
// =============================================================================

pub struct World {
    pub store: FakeStore,
    pub client: Arc<StoreClient<FakeStore>>,
    pub config: Config,
    pub root: WebId,
}

/// A fresh store with a root directory element and a wired client.
pub fn world() -> World {
    let config = Config::default();
    let store = FakeStore::new();
    let root_id = store.add_root(&config.connection.root_path, "DATAFRAMES");
    let client = Arc::new(StoreClient::new(store.clone()));
    World {
        store,
        client,
        config,
        root: WebId::new(root_id).expect("root id"),
    }
}

pub fn windows_identity(name: &str, sid: &str) -> UserIdentity {
    UserIdentity {
        identity_type: framestore::IdentityType::Windows,
        name: name.to_string(),
        authenticated: true,
        sid: Some(Sid::new(sid).expect("test sid")),
    }
}

// =============================================================================
// FakeCatalog - scriptable point catalog for the search engine
// =============================================================================

pub enum CatalogBehavior {
    Respond(Vec<Tag>),
    Fail(ApiError),
    Hang,
}

struct CatalogInner {
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    script: Mutex<VecDeque<CatalogBehavior>>,
    tags: Mutex<Vec<Tag>>,
}

/// Point catalog double. Scripted behaviors are consumed first; with an
/// empty script it filters the seeded tag list by substring.
#[derive(Clone)]
pub struct FakeCatalog {
    inner: Arc<CatalogInner>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
                script: Mutex::new(VecDeque::new()),
                tags: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_tags(count: usize) -> Self {
        let catalog = Self::new();
        for n in 0..count {
            catalog.seed_tag(tag(n));
        }
        catalog
    }

    pub fn seed_tag(&self, tag: Tag) {
        self.inner.tags.lock().expect("tags lock").push(tag);
    }

    pub fn push_behavior(&self, behavior: CatalogBehavior) {
        self.inner
            .script
            .lock()
            .expect("script lock")
            .push_back(behavior);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.inner.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl PointCatalog for FakeCatalog {
    async fn search_by_name(&self, pattern: &str, max_count: usize) -> Result<PointPage, ApiError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .queries
            .lock()
            .expect("queries lock")
            .push(pattern.to_string());

        let behavior = self.inner.script.lock().expect("script lock").pop_front();
        match behavior {
            Some(CatalogBehavior::Respond(tags)) => {
                let total = tags.len();
                Ok(PointPage {
                    tags: tags.into_iter().take(max_count).collect(),
                    total: Some(total),
                })
            }
            Some(CatalogBehavior::Fail(err)) => Err(err),
            Some(CatalogBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
            None => {
                let needle = pattern.to_lowercase();
                let tags = self.inner.tags.lock().expect("tags lock");
                let matches: Vec<Tag> = tags
                    .iter()
                    .filter(|tag| tag.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                let total = matches.len();
                Ok(PointPage {
                    tags: matches.into_iter().take(max_count).collect(),
                    total: Some(total),
                })
            }
        }
    }

    async fn by_path(&self, path: &str) -> Result<Tag, ApiError> {
        let tags = self.inner.tags.lock().expect("tags lock");
        tags.iter()
            .find(|tag| tag.path.eq_ignore_ascii_case(path))
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, format!("no point at {path}")))
    }
}

/// A deterministic tag for assertions.
pub fn tag(n: usize) -> Tag {
    Tag {
        id: WebId::new(format!("P{n}")).expect("tag id"),
        name: format!("tank{n}.temp"),
        path: format!("\\\\srv\\tank{n}.temp"),
        description: None,
        value_type: "Float64".to_string(),
        engineering_unit: Some("degC".to_string()),
    }
}

// =============================================================================
// FakeIdentity - identity provider double
// =============================================================================

pub struct FakeIdentity {
    outcome: Mutex<Option<Result<UserIdentity, ApiError>>>,
}

impl FakeIdentity {
    pub fn ok(identity: UserIdentity) -> Self {
        Self {
            outcome: Mutex::new(Some(Ok(identity))),
        }
    }

    pub fn failing(err: ApiError) -> Self {
        Self {
            outcome: Mutex::new(Some(Err(err))),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_user(&self) -> Result<UserIdentity, ApiError> {
        self.outcome
            .lock()
            .expect("identity lock")
            .clone()
            .expect("identity outcome configured")
    }
}
