//! Plain text-template GraphQL synthesis
//!
//! One pure function per operation kind, each returning the request text,
//! the bound variables, and the root field to read the result from. Staying
//! with text templates (not an AST builder) keeps the output byte-for-byte
//! aligned with the wire protocol and independently testable.

use log::warn;
use serde_json::{json, Map, Value};

use crate::fields::catalog::composite_template;
use crate::schema::types::{FieldKind, FieldSchema, ObjectSchema};

/// A synthesized request plus where to find its result in the response
#[derive(Debug, Clone)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
    /// Root field under `data` that carries the operation result
    pub root_field: String,
}

/// Strip whitespace from a human label so it interpolates into an
/// operation name as a valid bare identifier.
fn identifier(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Return projection covering every field in the schema. Composite kinds
/// expand to their catalog sub-field selection; relation fields have no
/// leaf selection and are omitted.
fn selection_set(object: &ObjectSchema) -> String {
    let mut selections = Vec::with_capacity(object.fields.len());
    for field in &object.fields {
        if field.kind == FieldKind::Relation {
            continue;
        }
        match composite_template(&field.kind) {
            Some(template) => {
                let subs: Vec<&str> = template.sub_fields.iter().map(|s| s.name).collect();
                selections.push(format!("{} {{ {} }}", field.name, subs.join(" ")));
            }
            None => selections.push(field.name.clone()),
        }
    }
    selections.join("\n      ")
}

/// Scalar GraphQL type used when filtering on a field.
fn filter_value_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Number => "Float",
        FieldKind::Boolean => "Boolean",
        _ => "String",
    }
}

/// `mutation Create<Label>($data: <singular>CreateInput!)` selecting every
/// schema field.
pub fn build_create(object: &ObjectSchema, data: &Map<String, Value>) -> GraphqlRequest {
    let label = identifier(&object.label_singular);
    let root_field = format!("create{}", object.graphql_type_name());
    let query = format!(
        "mutation Create{label}($data: {singular}CreateInput!) {{\n  \
           {root}(data: $data) {{\n      {selection}\n  }}\n}}",
        label = label,
        singular = object.name_singular,
        root = root_field,
        selection = selection_set(object),
    );
    GraphqlRequest {
        query,
        variables: json!({ "data": data }),
        root_field,
    }
}

/// Partial update: only caller-supplied keys land in `$data`; omitted
/// fields are neither defaulted nor nulled.
pub fn build_update(object: &ObjectSchema, id: &str, data: &Map<String, Value>) -> GraphqlRequest {
    let label = identifier(&object.label_singular);
    let root_field = format!("update{}", object.graphql_type_name());
    let query = format!(
        "mutation Update{label}($id: UUID!, $data: {singular}UpdateInput!) {{\n  \
           {root}(id: $id, data: $data) {{\n      {selection}\n  }}\n}}",
        label = label,
        singular = object.name_singular,
        root = root_field,
        selection = selection_set(object),
    );
    GraphqlRequest {
        query,
        variables: json!({ "id": id, "data": data }),
        root_field,
    }
}

/// Delete projects only the identifier.
pub fn build_delete(object: &ObjectSchema, id: &str) -> GraphqlRequest {
    let label = identifier(&object.label_singular);
    let root_field = format!("delete{}", object.graphql_type_name());
    let query = format!(
        "mutation Delete{label}($id: UUID!) {{\n  {root}(id: $id) {{\n      id\n  }}\n}}",
        label = label,
        root = root_field,
    );
    GraphqlRequest {
        query,
        variables: json!({ "id": id }),
        root_field,
    }
}

/// Single-record fetch by id, selecting every schema field.
pub fn build_get(object: &ObjectSchema, id: &str) -> GraphqlRequest {
    let label = identifier(&object.label_singular);
    let root_field = object.name_singular.clone();
    let query = format!(
        "query FindOne{label}($id: UUID!) {{\n  \
           {root}(filter: {{ id: {{ eq: $id }} }}) {{\n      {selection}\n  }}\n}}",
        label = label,
        root = root_field,
        selection = selection_set(object),
    );
    GraphqlRequest {
        query,
        variables: json!({ "id": id }),
        root_field,
    }
}

/// List query over the plural root selection, optionally filtered by a
/// case-insensitive substring match on the display field. Objects whose
/// display name is itself composite get the two-branch
/// firstName-or-lastName clause.
pub fn build_list(object: &ObjectSchema, limit: u32, search_term: Option<&str>) -> GraphqlRequest {
    let label = identifier(&object.label_plural);
    let root_field = object.name_plural.clone();

    let mut variable_decls = String::from("$limit: Int");
    let mut filter_clause = String::new();
    let mut variables = json!({ "limit": limit });

    if let Some(term) = search_term {
        if object.field("name").is_some() {
            variable_decls.push_str(", $search: String");
            filter_clause = if object.has_composite_display_name() {
                ", filter: { or: [\
                   { name: { firstName: { ilike: $search } } }, \
                   { name: { lastName: { ilike: $search } } }] }"
                    .to_string()
            } else {
                ", filter: { name: { ilike: $search } }".to_string()
            };
            variables["search"] = json!(format!("%{}%", term));
        } else {
            warn!(
                "object '{}' has no name field, ignoring search term '{}'",
                object.name_singular, term
            );
        }
    }

    let query = format!(
        "query FindMany{label}({decls}) {{\n  \
           {root}(first: $limit{filter}) {{\n    \
             edges {{\n      node {{\n      {selection}\n      }}\n    }}\n  }}\n}}",
        label = label,
        decls = variable_decls,
        root = root_field,
        filter = filter_clause,
        selection = selection_set(object),
    );
    GraphqlRequest {
        query,
        variables,
        root_field,
    }
}

/// Exact-match lookup on one field, used by the upsert match step. Projects
/// only the identifier; the follow-up update/create carries the data.
pub fn build_find_by(object: &ObjectSchema, field: &FieldSchema, value: &Value) -> GraphqlRequest {
    let label = identifier(&object.label_plural);
    let root_field = object.name_plural.clone();
    let query = format!(
        "query FindMany{label}($value: {value_type}!) {{\n  \
           {root}(first: 1, filter: {{ {field}: {{ eq: $value }} }}) {{\n    \
             edges {{\n      node {{\n      id\n      }}\n    }}\n  }}\n}}",
        label = label,
        value_type = filter_value_type(&field.kind),
        root = root_field,
        field = field.name,
    );
    GraphqlRequest {
        query,
        variables: json!({ "value": value }),
        root_field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldSource;

    fn field(name: &str, kind: FieldKind) -> FieldSchema {
        FieldSchema {
            name: name.to_string(),
            label: name.to_string(),
            kind,
            is_nullable: true,
            is_writable: true,
            is_active: true,
            is_system: false,
            source: FieldSource::Metadata,
            options: Vec::new(),
        }
    }

    fn company() -> ObjectSchema {
        ObjectSchema {
            name_singular: "company".to_string(),
            name_plural: "companies".to_string(),
            label_singular: "Company".to_string(),
            label_plural: "Companies".to_string(),
            is_custom: false,
            is_system: false,
            is_active: true,
            fields: vec![
                field("id", FieldKind::Uuid),
                field("name", FieldKind::Text),
                field("annualRevenue", FieldKind::Currency),
                field("owner", FieldKind::Relation),
            ],
        }
    }

    fn person() -> ObjectSchema {
        ObjectSchema {
            name_singular: "person".to_string(),
            name_plural: "people".to_string(),
            label_singular: "Person".to_string(),
            label_plural: "People".to_string(),
            is_custom: false,
            is_system: false,
            is_active: true,
            fields: vec![field("id", FieldKind::Uuid), field("name", FieldKind::FullName)],
        }
    }

    #[test]
    fn test_create_operation_name_and_input_type() {
        let request = build_create(&company(), &Map::new());
        assert!(request.query.contains("mutation CreateCompany("));
        assert!(request.query.contains("$data: companyCreateInput!"));
        assert!(request.query.contains("createCompany(data: $data)"));
        assert_eq!(request.root_field, "createCompany");
    }

    #[test]
    fn test_whitespace_stripped_from_labels() {
        let mut object = company();
        object.label_singular = "Custom Deal Stage".to_string();
        let request = build_create(&object, &Map::new());
        assert!(request.query.contains("mutation CreateCustomDealStage("));
    }

    #[test]
    fn test_projection_expands_composites_and_skips_relations() {
        let request = build_get(&company(), "00000000-0000-0000-0000-000000000000");
        assert!(request
            .query
            .contains("annualRevenue { amountMicros currencyCode }"));
        assert!(!request.query.contains("owner"));
        assert!(request.query.contains("name"));
    }

    #[test]
    fn test_update_is_partial() {
        let mut data = Map::new();
        data.insert("name".to_string(), json!("Acme"));
        let request = build_update(&company(), "11111111-1111-1111-1111-111111111111", &data);
        assert!(request.query.contains("$data: companyUpdateInput!"));
        assert_eq!(request.variables["data"], json!({"name": "Acme"}));
        assert_eq!(
            request.variables["id"],
            json!("11111111-1111-1111-1111-111111111111")
        );
    }

    #[test]
    fn test_delete_projects_identifier_only() {
        let request = build_delete(&company(), "11111111-1111-1111-1111-111111111111");
        assert!(request.query.contains("deleteCompany(id: $id) {\n      id\n  }"));
    }

    #[test]
    fn test_list_without_search_has_no_filter() {
        let request = build_list(&company(), 25, None);
        assert!(request.query.contains("query FindManyCompanies($limit: Int)"));
        assert!(request.query.contains("companies(first: $limit)"));
        assert!(!request.query.contains("filter"));
        assert_eq!(request.variables["limit"], json!(25));
    }

    #[test]
    fn test_list_search_on_scalar_display_field() {
        let request = build_list(&company(), 25, Some("acme"));
        assert!(request.query.contains("filter: { name: { ilike: $search } }"));
        assert_eq!(request.variables["search"], json!("%acme%"));
    }

    #[test]
    fn test_list_search_without_display_field_is_ignored() {
        let mut object = company();
        object.fields.retain(|f| f.name != "name");
        let request = build_list(&object, 25, Some("acme"));
        assert!(!request.query.contains("filter"));
        assert!(!request.query.contains("$search"));
        assert!(request.variables.get("search").is_none());
    }

    #[test]
    fn test_list_search_on_composite_display_field_branches() {
        let request = build_list(&person(), 10, Some("doe"));
        assert!(request.query.contains("firstName: { ilike: $search }"));
        assert!(request.query.contains("lastName: { ilike: $search }"));
    }

    #[test]
    fn test_find_by_types_the_filter_value() {
        let object = company();
        let by_name = build_find_by(&object, object.field("name").unwrap(), &json!("Acme"));
        assert!(by_name.query.contains("$value: String!"));
        assert!(by_name.query.contains("name: { eq: $value }"));

        let employees = field("employees", FieldKind::Number);
        let by_count = build_find_by(&object, &employees, &json!(12));
        assert!(by_count.query.contains("$value: Float!"));
    }
}
