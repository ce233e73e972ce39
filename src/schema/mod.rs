//! Schema discovery, caching and merging
//!
//! The object and field set of a deployment is not known at build time: it
//! is fetched from the metadata API, merged with the data API's own
//! introspection, and cached per connection domain with time-based
//! invalidation.

pub mod cache;
pub mod fetcher;
pub mod merger;
pub mod types;


pub use cache::SchemaCache;
pub use fetcher::SchemaFetcher;
pub use merger::SchemaMerger;
pub use types::{
    CachedSchema, FieldIntent, FieldKind, FieldOption, FieldSchema, FieldSource, ObjectSchema,
};
