//! Record operations over a discovered schema
//!
//! Sequences schema lookup, value transformation, query synthesis and the
//! transport round trip for single-record and bulk operations. Bulk paths
//! issue their requests sequentially and isolate each item's failure into
//! that item's result slot; input ordering is preserved and nothing is
//! retried.

use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ConnectionConfig;
use crate::error::{AdapterError, AdapterResult, ErrorKind};
use crate::fields::transform::unflatten;
use crate::query;
use crate::query::GraphqlRequest;
use crate::schema::cache::SchemaCache;
use crate::schema::merger::SchemaMerger;
use crate::schema::types::{FieldIntent, FieldSchema, ObjectSchema};
use crate::transport::{EndpointKind, Transport};


/// How an upsert locates the record to update
#[derive(Debug, Clone)]
pub enum UpsertMatch {
    ById(String),
    ByField { name: String, value: Value },
}

/// One isolated failure inside a bulk batch, keeping the error taxonomy
/// machine-readable alongside the display message
#[derive(Debug, Clone, Serialize)]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AdapterError> for ItemError {
    fn from(error: &AdapterError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Per-item result of a bulk operation
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

impl ItemOutcome {
    fn ok(index: usize, record: Value) -> Self {
        Self {
            index,
            success: true,
            record: Some(record),
            error: None,
        }
    }

    fn failed(index: usize, error: &AdapterError) -> Self {
        Self {
            index,
            success: false,
            record: None,
            error: Some(ItemError::from(error)),
        }
    }
}

/// Executes CRUD and bulk operations for one connection
pub struct OperationExecutor<T: Transport> {
    transport: T,
    cache: SchemaCache,
    config: ConnectionConfig,
}

impl<T: Transport> OperationExecutor<T> {
    pub fn new(transport: T, config: ConnectionConfig) -> Self {
        Self {
            transport,
            cache: SchemaCache::new(),
            config,
        }
    }

    /// The transport in use, mainly for inspection in tests.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Merged, intent-filtered field list for one object, for callers that
    /// build field-selection UIs.
    pub async fn get_object_schema(
        &self,
        object_name: &str,
        intent: FieldIntent,
        force_refresh: bool,
    ) -> AdapterResult<Vec<FieldSchema>> {
        SchemaMerger::merged_fields(
            &self.transport,
            &self.cache,
            &self.config,
            object_name,
            intent,
            force_refresh,
        )
        .await
    }

    /// Create one record from a flat field map.
    pub async fn create_record(
        &self,
        object_name: &str,
        flat: &Map<String, Value>,
    ) -> AdapterResult<Value> {
        let object = self.object(object_name).await?;
        let data = unflatten(flat, &object.fields);
        info!("creating {} record", object.name_singular);
        let request = query::build_create(&object, &data);
        self.execute(&request).await
    }

    /// Partial update: only the supplied keys are written.
    pub async fn update_record(
        &self,
        object_name: &str,
        id: &str,
        flat: &Map<String, Value>,
    ) -> AdapterResult<Value> {
        validate_record_id(id)?;
        let object = self.object(object_name).await?;
        let data = unflatten(flat, &object.fields);
        info!("updating {} record {}", object.name_singular, id);
        let request = query::build_update(&object, id, &data);
        self.execute(&request).await
    }

    /// Fetch one record by id; absent records are a NotFound error.
    pub async fn get_record(&self, object_name: &str, id: &str) -> AdapterResult<Value> {
        validate_record_id(id)?;
        let object = self.object(object_name).await?;
        let request = query::build_get(&object, id);
        let record = self.execute(&request).await?;
        if record.is_null() {
            return Err(AdapterError::NotFound(format!(
                "{} record {} does not exist",
                object.name_singular, id
            )));
        }
        Ok(record)
    }

    /// Delete one record by id.
    pub async fn delete_record(&self, object_name: &str, id: &str) -> AdapterResult<Value> {
        validate_record_id(id)?;
        let object = self.object(object_name).await?;
        info!("deleting {} record {}", object.name_singular, id);
        let request = query::build_delete(&object, id);
        self.execute(&request).await
    }

    /// List up to `limit` records, optionally filtered by a substring match
    /// on the display field.
    pub async fn list_records(
        &self,
        object_name: &str,
        limit: u32,
        search_term: Option<&str>,
    ) -> AdapterResult<Vec<Value>> {
        let object = self.object(object_name).await?;
        let request = query::build_list(&object, limit, search_term);
        let body = self
            .transport
            .request(EndpointKind::Graphql, &request.query, Some(request.variables))
            .await?;
        let edges = body
            .pointer(&format!("/data/{}/edges", request.root_field))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AdapterError::Schema(format!(
                    "list response is missing the {} edge envelope",
                    request.root_field
                ))
            })?;
        Ok(edges.iter().map(|edge| edge["node"].clone()).collect())
    }

    /// Update-or-create. By-id matching falls back to creating a record
    /// with the requested id when nothing matches; by-field matching looks
    /// the record up with an exact-match filter first.
    pub async fn upsert_record(
        &self,
        object_name: &str,
        matcher: &UpsertMatch,
        flat: &Map<String, Value>,
    ) -> AdapterResult<Value> {
        match matcher {
            UpsertMatch::ById(id) => {
                validate_record_id(id)?;
                match self.get_record(object_name, id).await {
                    Ok(_) => self.update_record(object_name, id, flat).await,
                    Err(AdapterError::NotFound(_)) => {
                        let mut with_id = flat.clone();
                        with_id.insert("id".to_string(), Value::String(id.clone()));
                        self.create_record(object_name, &with_id).await
                    }
                    Err(e) => Err(e),
                }
            }
            UpsertMatch::ByField { name, value } => {
                match self.find_record_id(object_name, name, value).await? {
                    Some(id) => self.update_record(object_name, &id, flat).await,
                    None => self.create_record(object_name, flat).await,
                }
            }
        }
    }

    /// Create N records; one item's failure never aborts the batch.
    pub async fn bulk_create(
        &self,
        object_name: &str,
        items: &Value,
    ) -> AdapterResult<Vec<ItemOutcome>> {
        let items = bulk_items(items)?;
        let mut outcomes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let outcome = match item.as_object() {
                Some(flat) => match self.create_record(object_name, flat).await {
                    Ok(record) => ItemOutcome::ok(index, record),
                    Err(e) => ItemOutcome::failed(index, &e),
                },
                None => ItemOutcome::failed(
                    index,
                    &AdapterError::MalformedInput("bulk item must be a JSON object".to_string()),
                ),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Update N records; each item carries its `id` plus the fields to set.
    pub async fn bulk_update(
        &self,
        object_name: &str,
        items: &Value,
    ) -> AdapterResult<Vec<ItemOutcome>> {
        let items = bulk_items(items)?;
        let mut outcomes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let outcome = match split_id(item) {
                Ok((id, flat)) => match self.update_record(object_name, &id, &flat).await {
                    Ok(record) => ItemOutcome::ok(index, record),
                    Err(e) => ItemOutcome::failed(index, &e),
                },
                Err(e) => ItemOutcome::failed(index, &e),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Fetch N records by id.
    pub async fn bulk_get(
        &self,
        object_name: &str,
        ids: &Value,
    ) -> AdapterResult<Vec<ItemOutcome>> {
        let ids = bulk_items(ids)?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let outcome = match id.as_str() {
                Some(id) => match self.get_record(object_name, id).await {
                    Ok(record) => ItemOutcome::ok(index, record),
                    Err(e) => ItemOutcome::failed(index, &e),
                },
                None => ItemOutcome::failed(
                    index,
                    &AdapterError::MalformedInput("bulk item must be a record id".to_string()),
                ),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Delete N records by id.
    pub async fn bulk_delete(
        &self,
        object_name: &str,
        ids: &Value,
    ) -> AdapterResult<Vec<ItemOutcome>> {
        let ids = bulk_items(ids)?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let outcome = match id.as_str() {
                Some(id) => match self.delete_record(object_name, id).await {
                    Ok(record) => ItemOutcome::ok(index, record),
                    Err(e) => ItemOutcome::failed(index, &e),
                },
                None => ItemOutcome::failed(
                    index,
                    &AdapterError::MalformedInput("bulk item must be a record id".to_string()),
                ),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Upsert N records, matching each by the value it carries in
    /// `match_field`. The bulk path matches by field only; by-id upsert
    /// exists on the single-record path.
    pub async fn bulk_upsert(
        &self,
        object_name: &str,
        match_field: &str,
        items: &Value,
    ) -> AdapterResult<Vec<ItemOutcome>> {
        let items = bulk_items(items)?;
        let mut outcomes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let outcome = match item.as_object() {
                Some(flat) => match flat.get(match_field) {
                    Some(value) => {
                        let matcher = UpsertMatch::ByField {
                            name: match_field.to_string(),
                            value: value.clone(),
                        };
                        match self.upsert_record(object_name, &matcher, flat).await {
                            Ok(record) => ItemOutcome::ok(index, record),
                            Err(e) => ItemOutcome::failed(index, &e),
                        }
                    }
                    None => ItemOutcome::failed(
                        index,
                        &AdapterError::MalformedInput(format!(
                            "bulk item is missing the match field '{}'",
                            match_field
                        )),
                    ),
                },
                None => ItemOutcome::failed(
                    index,
                    &AdapterError::MalformedInput("bulk item must be a JSON object".to_string()),
                ),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn object(&self, object_name: &str) -> AdapterResult<ObjectSchema> {
        self.cache
            .object(&self.transport, &self.config, object_name, false)
            .await
    }

    /// Issue one synthesized request and pull the result from its root field.
    async fn execute(&self, request: &GraphqlRequest) -> AdapterResult<Value> {
        debug!("executing {}", request.root_field);
        let body = self
            .transport
            .request(
                EndpointKind::Graphql,
                &request.query,
                Some(request.variables.clone()),
            )
            .await?;
        Ok(body["data"][&request.root_field].clone())
    }

    /// Exact-match lookup of one record id, for the upsert match step.
    async fn find_record_id(
        &self,
        object_name: &str,
        field_name: &str,
        value: &Value,
    ) -> AdapterResult<Option<String>> {
        let object = self.object(object_name).await?;
        let field = object.field(field_name).ok_or_else(|| {
            AdapterError::Schema(format!(
                "field '{}' is not present on object '{}'",
                field_name, object_name
            ))
        })?;
        let request = query::build_find_by(&object, field, value);
        let body = self
            .transport
            .request(
                EndpointKind::Graphql,
                &request.query,
                Some(request.variables.clone()),
            )
            .await?;
        Ok(body
            .pointer(&format!("/data/{}/edges/0/node/id", request.root_field))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

/// A bulk payload must be a JSON array; anything else is malformed input.
fn bulk_items(items: &Value) -> AdapterResult<&Vec<Value>> {
    items.as_array().ok_or_else(|| {
        AdapterError::MalformedInput("bulk payload must be a JSON array".to_string())
    })
}

/// Split a bulk update item into its id and the remaining field map.
fn split_id(item: &Value) -> AdapterResult<(String, Map<String, Value>)> {
    let flat = item.as_object().ok_or_else(|| {
        AdapterError::MalformedInput("bulk item must be a JSON object".to_string())
    })?;
    let id = flat
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AdapterError::MalformedInput("bulk update item is missing an 'id' key".to_string())
        })?
        .to_string();
    let mut rest = flat.clone();
    rest.remove("id");
    Ok((id, rest))
}

fn validate_record_id(id: &str) -> AdapterResult<()> {
    Uuid::parse_str(id).map(|_| ()).map_err(|_| {
        AdapterError::MalformedInput(format!("record id '{}' is not a valid UUID", id))
    })
}
