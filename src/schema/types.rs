//! Core schema data model
//!
//! These types describe one discovered deployment: its entity types, their
//! fields, and the cached snapshot the rest of the adapter works from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a cached schema snapshot stays valid
pub const SCHEMA_TTL_MS: i64 = 600_000;

/// Closed vocabulary of field types.
///
/// Unrecognized wire type names land in [`FieldKind::Unknown`] instead of
/// being silently misclassified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    DateTime,
    Date,
    Uuid,
    Select,
    MultiSelect,
    Currency,
    Emails,
    Phones,
    Links,
    FullName,
    Address,
    RawJson,
    Array,
    Relation,
    Unknown(String),
}

impl FieldKind {
    /// Parse a type tag as emitted by the metadata API.
    pub fn from_metadata_tag(tag: &str) -> Self {
        match tag {
            "TEXT" => FieldKind::Text,
            "NUMBER" => FieldKind::Number,
            "BOOLEAN" => FieldKind::Boolean,
            "DATE_TIME" => FieldKind::DateTime,
            "DATE" => FieldKind::Date,
            "UUID" => FieldKind::Uuid,
            "SELECT" => FieldKind::Select,
            "MULTI_SELECT" => FieldKind::MultiSelect,
            "CURRENCY" => FieldKind::Currency,
            "EMAILS" => FieldKind::Emails,
            "PHONES" => FieldKind::Phones,
            "LINKS" => FieldKind::Links,
            "FULL_NAME" => FieldKind::FullName,
            "ADDRESS" => FieldKind::Address,
            "RAW_JSON" => FieldKind::RawJson,
            "ARRAY" => FieldKind::Array,
            "RELATION" => FieldKind::Relation,
            other => FieldKind::Unknown(other.to_string()),
        }
    }

    /// Map a raw introspection wire type name into the closed vocabulary.
    ///
    /// A `LIST<...>` wrapper around an enum type denotes a multi-select; a
    /// bare enum type denotes a select; composite type names map 1:1; any
    /// other scalar falls back to text.
    pub fn from_introspection_type(raw: &str) -> Self {
        let (inner, is_list) = match raw.strip_prefix("LIST<").and_then(|r| r.strip_suffix('>')) {
            Some(inner) => (inner, true),
            None => (raw, false),
        };

        if inner.contains("Enum") {
            return if is_list {
                FieldKind::MultiSelect
            } else {
                FieldKind::Select
            };
        }

        match inner {
            "FullName" => FieldKind::FullName,
            "Links" => FieldKind::Links,
            "Currency" => FieldKind::Currency,
            "Address" => FieldKind::Address,
            _ => FieldKind::Text,
        }
    }

    /// Whether values of this kind are nested objects on the wire.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            FieldKind::FullName | FieldKind::Links | FieldKind::Currency | FieldKind::Address
        )
    }

    /// The metadata-API tag for this kind.
    pub fn as_tag(&self) -> &str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Number => "NUMBER",
            FieldKind::Boolean => "BOOLEAN",
            FieldKind::DateTime => "DATE_TIME",
            FieldKind::Date => "DATE",
            FieldKind::Uuid => "UUID",
            FieldKind::Select => "SELECT",
            FieldKind::MultiSelect => "MULTI_SELECT",
            FieldKind::Currency => "CURRENCY",
            FieldKind::Emails => "EMAILS",
            FieldKind::Phones => "PHONES",
            FieldKind::Links => "LINKS",
            FieldKind::FullName => "FULL_NAME",
            FieldKind::Address => "ADDRESS",
            FieldKind::RawJson => "RAW_JSON",
            FieldKind::Array => "ARRAY",
            FieldKind::Relation => "RELATION",
            FieldKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from_metadata_tag(&tag)
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_tag().to_string()
    }
}

/// Which schema source a field came from; used only for merge precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Metadata,
    Introspection,
}

/// One enumerated choice of a select/multi-select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
}

/// One field of a discovered object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Wire key, unique within its object
    pub name: String,
    /// Display name
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub is_nullable: bool,
    /// Derived: writable iff not explicitly marked read-only upstream
    #[serde(default = "default_true")]
    pub is_writable: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_system: bool,
    pub source: FieldSource,
    /// Enumerated choices, populated for metadata-sourced select fields
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

fn default_true() -> bool {
    true
}

/// One discovered entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub name_singular: String,
    pub name_plural: String,
    pub label_singular: String,
    pub label_plural: String,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Fields, unique by name; order carries no meaning
    pub fields: Vec<FieldSchema>,
}

impl ObjectSchema {
    /// Look up one field by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// GraphQL type name of this object (capitalized singular name).
    pub fn graphql_type_name(&self) -> String {
        capitalize(&self.name_singular)
    }

    /// Whether the display field of this object is a composite full name.
    ///
    /// `name` is a plain scalar on every object except the person-like one,
    /// where the metadata API types it FULL_NAME.
    pub fn has_composite_display_name(&self) -> bool {
        self.field("name")
            .map(|f| f.kind == FieldKind::FullName)
            .unwrap_or(false)
    }
}

/// Capitalize the first character of an identifier.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Caller intent when asking for a merged field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIntent {
    Read,
    Write,
}

/// One schema snapshot, scoped to the connection it was fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSchema {
    pub objects: Vec<ObjectSchema>,
    pub cached_at: DateTime<Utc>,
    /// Identity of the connection the snapshot was fetched from
    pub domain: String,
}

impl CachedSchema {
    /// Validity predicate: young enough and fetched from the same domain.
    pub fn is_fresh(&self, now: DateTime<Utc>, domain: &str) -> bool {
        let age_ms = now.signed_duration_since(self.cached_at).num_milliseconds();
        age_ms < SCHEMA_TTL_MS && self.domain == domain
    }

    /// Resolve one object by singular or plural name.
    pub fn object(&self, name: &str) -> Option<&ObjectSchema> {
        self.objects
            .iter()
            .find(|o| o.name_singular == name || o.name_plural == name)
    }
}
