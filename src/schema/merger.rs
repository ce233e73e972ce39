//! Dual-source field merge
//!
//! The metadata API carries rich per-field data (options with stable
//! ordering and color) but omits certain built-in enumerations; GraphQL
//! introspection exposes those but nothing more. The merge inserts
//! introspection fields first and overwrites with metadata fields of the
//! same name, so metadata always wins on collision.

use log::{debug, warn};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::config::ConnectionConfig;
use crate::error::AdapterResult;
use crate::schema::cache::SchemaCache;
use crate::schema::types::{FieldIntent, FieldKind, FieldSchema, FieldSource, ObjectSchema};
use crate::transport::{EndpointKind, Transport};

const INTROSPECTION_QUERY: &str = "query FieldIntrospection($name: String!) {\n\
   __type(name: $name) {\n\
     fields {\n\
       name\n\
       type { name kind ofType { name kind } }\n\
     }\n\
   }\n\
 }";

/// Fields the platform treats as standard on every object, in fixed
/// presentation order after the display name
const STANDARD_FIELDS: [&str; 4] = ["id", "createdAt", "updatedAt", "deletedAt"];

/// Combines cached metadata fields with introspection fields for one object
pub struct SchemaMerger;

impl SchemaMerger {
    /// Produce the deduplicated, filtered, presentation-ordered field list
    /// for one object.
    pub async fn merged_fields(
        transport: &dyn Transport,
        cache: &SchemaCache,
        config: &ConnectionConfig,
        object_name: &str,
        intent: FieldIntent,
        force_refresh: bool,
    ) -> AdapterResult<Vec<FieldSchema>> {
        let object = cache
            .object(transport, config, object_name, force_refresh)
            .await?;
        let introspected = Self::introspect(transport, &object).await?;

        // Introspection first, metadata overwrites: metadata wins.
        let mut merged: HashMap<String, FieldSchema> = introspected
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();
        for field in object.fields {
            merged.insert(field.name.clone(), field);
        }

        let mut fields: Vec<FieldSchema> = merged
            .into_values()
            .filter(|f| f.is_active)
            .filter(|f| intent == FieldIntent::Read || f.is_writable)
            .collect();
        Self::sort_for_presentation(&mut fields);
        Ok(fields)
    }

    /// Fetch the introspection-sourced field list for one object type.
    async fn introspect(
        transport: &dyn Transport,
        object: &ObjectSchema,
    ) -> AdapterResult<Vec<FieldSchema>> {
        let type_name = object.graphql_type_name();
        debug!("introspecting GraphQL type {}", type_name);
        let body = transport
            .request(
                EndpointKind::Graphql,
                INTROSPECTION_QUERY,
                Some(json!({ "name": type_name })),
            )
            .await?;

        let nodes = match body.pointer("/data/__type/fields").and_then(Value::as_array) {
            Some(nodes) => nodes,
            None => {
                // Not every discovered object is introspectable; the
                // metadata source alone still yields a usable field list.
                warn!("type {} is not introspectable, using metadata only", type_name);
                return Ok(Vec::new());
            }
        };

        Ok(nodes
            .iter()
            .filter_map(Self::decode_introspection_field)
            .collect())
    }

    fn decode_introspection_field(node: &Value) -> Option<FieldSchema> {
        let name = node["name"].as_str()?.to_string();
        let raw_type = Self::raw_wire_type(&node["type"]);

        Some(FieldSchema {
            label: name.clone(),
            name,
            kind: FieldKind::from_introspection_type(&raw_type),
            is_nullable: true,
            is_writable: true,
            is_active: true,
            is_system: false,
            source: FieldSource::Introspection,
            options: Vec::new(),
        })
    }

    /// Collapse an introspection type reference into the `LIST<...>`-style
    /// wire string the kind mapper understands.
    fn raw_wire_type(type_ref: &Value) -> String {
        let kind = type_ref["kind"].as_str().unwrap_or("");
        if kind == "LIST" {
            let inner = type_ref
                .pointer("/ofType/name")
                .and_then(Value::as_str)
                .unwrap_or("");
            format!("LIST<{}>", inner)
        } else {
            type_ref["name"].as_str().unwrap_or("").to_string()
        }
    }

    /// Deterministic presentation order: the literal `name` field first,
    /// then the standard set in fixed order, then the rest alphabetically
    /// by label.
    pub fn sort_for_presentation(fields: &mut [FieldSchema]) {
        fields.sort_by_key(|f| {
            if f.name == "name" {
                (0, 0, String::new())
            } else if let Some(idx) = STANDARD_FIELDS.iter().position(|s| *s == f.name) {
                (1, idx, String::new())
            } else {
                (2, 0, f.label.clone())
            }
        });
    }
}
