//! Outbound transport seam
//!
//! Everything the adapter sends upstream goes through the single
//! [`Transport::request`] call shape, so schema discovery, query synthesis
//! and the operation executor stay testable without a live deployment.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AdapterResult;

pub mod http;
#[cfg(feature = "mock")]
pub mod mock;

pub use http::HttpTransport;
#[cfg(feature = "mock")]
pub use mock::MockTransport;

/// Which upstream endpoint a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// The object/field metadata API
    Metadata,
    /// The GraphQL data API
    Graphql,
    /// The REST data API
    Rest,
}

/// One call shape for all upstream traffic.
///
/// For [`EndpointKind::Metadata`] and [`EndpointKind::Graphql`] the
/// `path_or_query` argument is GraphQL request text; for
/// [`EndpointKind::Rest`] it is a path below `/rest/`. Implementations must
/// translate non-2xx responses and decoded GraphQL error arrays into the
/// adapter error taxonomy before returning.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        kind: EndpointKind,
        path_or_query: &str,
        variables: Option<Value>,
    ) -> AdapterResult<Value>;
}
