//! Metadata-API schema fetch
//!
//! One paginated round trip against the metadata endpoint, decoding the
//! two-level edges/node envelope into a flat object list.

use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{AdapterError, AdapterResult};
use crate::schema::types::{FieldKind, FieldOption, FieldSchema, FieldSource, ObjectSchema};
use crate::transport::{EndpointKind, Transport};

/// Page size for objects and for fields per object
const PAGE_SIZE: u32 = 200;

/// Fetches and decodes the metadata-API view of a deployment's schema
pub struct SchemaFetcher;

impl SchemaFetcher {
    /// Fetch all object schemas in a single network round trip.
    pub async fn fetch(transport: &dyn Transport) -> AdapterResult<Vec<ObjectSchema>> {
        debug!("fetching object metadata ({} objects max)", PAGE_SIZE);
        let body = transport
            .request(EndpointKind::Metadata, &Self::metadata_query(), None)
            .await?;
        let objects = Self::decode(&body)?;
        info!("discovered {} object schemas", objects.len());
        Ok(objects)
    }

    fn metadata_query() -> String {
        format!(
            "query ObjectMetadataItems {{\n\
               objects(paging: {{ first: {page} }}) {{\n\
                 edges {{\n\
                   node {{\n\
                     nameSingular\n\
                     namePlural\n\
                     labelSingular\n\
                     labelPlural\n\
                     isCustom\n\
                     isSystem\n\
                     isActive\n\
                     fields(paging: {{ first: {page} }}) {{\n\
                       edges {{\n\
                         node {{\n\
                           name\n\
                           label\n\
                           type\n\
                           isNullable\n\
                           isActive\n\
                           isSystem\n\
                           isUIReadOnly\n\
                           options {{ value label color position }}\n\
                         }}\n\
                       }}\n\
                     }}\n\
                   }}\n\
                 }}\n\
               }}\n\
             }}",
            page = PAGE_SIZE
        )
    }

    fn decode(body: &Value) -> AdapterResult<Vec<ObjectSchema>> {
        let edges = body
            .pointer("/data/objects/edges")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AdapterError::Schema(
                    "metadata response is missing the objects edge envelope".to_string(),
                )
            })?;

        let mut objects = Vec::with_capacity(edges.len());
        for edge in edges {
            let node = &edge["node"];
            match Self::decode_object(node) {
                Some(object) => objects.push(object),
                None => warn!("skipping metadata object node without a name: {}", node),
            }
        }
        Ok(objects)
    }

    fn decode_object(node: &Value) -> Option<ObjectSchema> {
        let name_singular = node["nameSingular"].as_str()?.to_string();
        let name_plural = node["namePlural"].as_str()?.to_string();

        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        if let Some(field_edges) = node.pointer("/fields/edges").and_then(Value::as_array) {
            for edge in field_edges {
                if let Some(field) = Self::decode_field(&edge["node"]) {
                    // Field names are unique within an object; first one wins.
                    if seen.insert(field.name.clone()) {
                        fields.push(field);
                    }
                }
            }
        }

        Some(ObjectSchema {
            label_singular: node["labelSingular"]
                .as_str()
                .unwrap_or(&name_singular)
                .to_string(),
            label_plural: node["labelPlural"]
                .as_str()
                .unwrap_or(&name_plural)
                .to_string(),
            name_singular,
            name_plural,
            is_custom: node["isCustom"].as_bool().unwrap_or(false),
            is_system: node["isSystem"].as_bool().unwrap_or(false),
            is_active: node["isActive"].as_bool().unwrap_or(true),
            fields,
        })
    }

    fn decode_field(node: &Value) -> Option<FieldSchema> {
        let name = node["name"].as_str()?.to_string();
        let options = node["options"]
            .as_array()
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| serde_json::from_value(o.clone()).ok())
                    .collect::<Vec<FieldOption>>()
            })
            .unwrap_or_default();

        Some(FieldSchema {
            label: node["label"].as_str().unwrap_or(&name).to_string(),
            name,
            kind: FieldKind::from_metadata_tag(node["type"].as_str().unwrap_or("")),
            is_nullable: node["isNullable"].as_bool().unwrap_or(true),
            // Fail open toward writability: absence of an explicit
            // read-only marker means the field is editable.
            is_writable: !node["isUIReadOnly"].as_bool().unwrap_or(false),
            is_active: node["isActive"].as_bool().unwrap_or(true),
            is_system: node["isSystem"].as_bool().unwrap_or(false),
            source: FieldSource::Metadata,
            options,
        })
    }
}
