//! crmlink — an adapter that lets a workflow-automation host perform CRUD and
//! bulk operations against a CRM platform whose data model is discovered at
//! runtime rather than fixed at build time.
//!
//! The platform exposes two independently-shaped schema sources: a metadata
//! API describing user-defined object/field definitions and the data API's
//! own GraphQL introspection. This crate fetches and merges both, caches the
//! result per connection domain, maps composite field values to and from a
//! flat key/value editing model, and synthesizes the GraphQL request text for
//! whatever object shapes were discovered.

pub mod config;
pub mod error;
pub mod executor;
pub mod fields;
pub mod query;
pub mod schema;
pub mod transport;

pub use config::ConnectionConfig;
pub use error::{AdapterError, AdapterResult, ErrorKind};
pub use executor::{ItemError, ItemOutcome, OperationExecutor, UpsertMatch};
pub use query::GraphqlRequest;
pub use schema::{
    CachedSchema, FieldIntent, FieldKind, FieldOption, FieldSchema, FieldSource, ObjectSchema,
    SchemaCache, SchemaFetcher, SchemaMerger,
};
pub use transport::{EndpointKind, HttpTransport, Transport};

#[cfg(feature = "mock")]
pub use transport::MockTransport;
