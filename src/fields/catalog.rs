//! Static composite-field and wire-format catalogs
//!
//! Pure data, loaded once. The composite catalog drives the flat ⇄ nested
//! transform and the sub-field selection sets of synthesized queries; the
//! format catalog is a documentation/validation hint lookup only.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::schema::types::FieldKind;

/// One sub-field descriptor of a composite type
#[derive(Debug, Clone)]
pub struct SubFieldTemplate {
    /// Wire name of the sub-field
    pub name: &'static str,
    /// Semantic kind of the sub-value
    pub kind: FieldKind,
    /// Default wire value when nothing is supplied
    pub default_value: Value,
}

/// Ordered sub-field list of one composite type
#[derive(Debug, Clone)]
pub struct CompositeTemplate {
    pub kind: FieldKind,
    pub sub_fields: Vec<SubFieldTemplate>,
}

fn sub(name: &'static str, kind: FieldKind, default_value: Value) -> SubFieldTemplate {
    SubFieldTemplate {
        name,
        kind,
        default_value,
    }
}

static COMPOSITE_CATALOG: Lazy<Vec<CompositeTemplate>> = Lazy::new(|| {
    vec![
        CompositeTemplate {
            kind: FieldKind::FullName,
            sub_fields: vec![
                sub("firstName", FieldKind::Text, json!("")),
                sub("lastName", FieldKind::Text, json!("")),
            ],
        },
        CompositeTemplate {
            kind: FieldKind::Links,
            sub_fields: vec![
                sub("primaryLinkLabel", FieldKind::Text, json!("")),
                sub("primaryLinkUrl", FieldKind::Text, json!("")),
                sub("secondaryLinks", FieldKind::RawJson, Value::Null),
            ],
        },
        CompositeTemplate {
            kind: FieldKind::Currency,
            sub_fields: vec![
                sub("amountMicros", FieldKind::Number, Value::Null),
                sub("currencyCode", FieldKind::Text, json!("")),
            ],
        },
        CompositeTemplate {
            kind: FieldKind::Address,
            sub_fields: vec![
                sub("addressStreet1", FieldKind::Text, json!("")),
                sub("addressStreet2", FieldKind::Text, json!("")),
                sub("addressCity", FieldKind::Text, json!("")),
                sub("addressState", FieldKind::Text, json!("")),
                sub("addressPostcode", FieldKind::Text, json!("")),
                sub("addressCountry", FieldKind::Text, json!("")),
                sub("addressLat", FieldKind::Number, Value::Null),
                sub("addressLng", FieldKind::Number, Value::Null),
            ],
        },
    ]
});

/// Look up the composite template for a field kind, if it has one.
pub fn composite_template(kind: &FieldKind) -> Option<&'static CompositeTemplate> {
    COMPOSITE_CATALOG.iter().find(|t| t.kind == *kind)
}

static FORMAT_CATALOG: Lazy<Vec<(FieldKind, &'static str)>> = Lazy::new(|| {
    vec![
        (FieldKind::Text, "plain string"),
        (FieldKind::Number, "numeric value"),
        (FieldKind::Boolean, "true or false"),
        (FieldKind::DateTime, "ISO 8601 timestamp, e.g. 2024-01-31T09:30:00Z"),
        (FieldKind::Date, "ISO 8601 date, e.g. 2024-01-31"),
        (FieldKind::Uuid, "UUID string"),
        (FieldKind::Select, "one option value"),
        (FieldKind::MultiSelect, "array of option values"),
        (
            FieldKind::Currency,
            r#"{ "amountMicros": "5000000", "currencyCode": "USD" } — amountMicros returned as a string"#,
        ),
        (FieldKind::Emails, r#"{ "primaryEmail": "a@b.com" }"#),
        (FieldKind::Phones, r#"{ "primaryPhoneNumber": "+1510..." }"#),
        (
            FieldKind::Links,
            r#"{ "primaryLinkUrl": "...", "primaryLinkLabel": "...", "secondaryLinks": [...] }"#,
        ),
        (FieldKind::FullName, r#"{ "firstName": "...", "lastName": "..." }"#),
        (
            FieldKind::Address,
            r#"{ "addressStreet1": "...", "addressStreet2": "...", "addressCity": "...", "addressState": "...", "addressPostcode": "...", "addressCountry": "...", "addressLat": "...", "addressLng": "..." } — lat/lng returned as strings"#,
        ),
        (FieldKind::RawJson, "arbitrary JSON value"),
        (FieldKind::Array, "JSON array"),
    ]
});

/// Expected wire-shape hint for a field kind. Lookup only; no behavior
/// depends on the hint text.
pub fn wire_format_hint(kind: &FieldKind) -> Option<&'static str> {
    FORMAT_CATALOG
        .iter()
        .find(|(k, _)| k == kind)
        .map(|(_, hint)| *hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_templates_registered() {
        for kind in [
            FieldKind::FullName,
            FieldKind::Links,
            FieldKind::Currency,
            FieldKind::Address,
        ] {
            assert!(composite_template(&kind).is_some(), "{:?}", kind);
        }
        assert!(composite_template(&FieldKind::Text).is_none());
    }

    #[test]
    fn test_full_name_template_order() {
        let template = composite_template(&FieldKind::FullName).unwrap();
        let names: Vec<&str> = template.sub_fields.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["firstName", "lastName"]);
    }

    #[test]
    fn test_address_template_covers_wire_shape() {
        let template = composite_template(&FieldKind::Address).unwrap();
        assert_eq!(template.sub_fields.len(), 8);
        assert!(template.sub_fields.iter().any(|s| s.name == "addressLat"));
    }

    #[test]
    fn test_format_hint_lookup() {
        assert!(wire_format_hint(&FieldKind::Currency)
            .unwrap()
            .contains("amountMicros"));
        assert!(wire_format_hint(&FieldKind::Relation).is_none());
    }
}
