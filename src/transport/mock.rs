//! Mock transport implementation for tests
//!
//! Serves a scripted queue of responses and records every request it saw,
//! so schema discovery and the operation executor can be exercised without
//! a live deployment.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{AdapterError, AdapterResult};
use crate::transport::{EndpointKind, Transport};

/// One request as observed by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub kind: EndpointKind,
    pub path_or_query: String,
    pub variables: Option<Value>,
}

/// Transport test double with scripted responses
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<AdapterResult<Value>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response to serve, in FIFO order.
    pub fn push_response(&self, response: AdapterResult<Value>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// All requests observed so far, in call order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        kind: EndpointKind,
        path_or_query: &str,
        variables: Option<Value>,
    ) -> AdapterResult<Value> {
        self.requests.lock().unwrap().push(RecordedRequest {
            kind,
            path_or_query: path_or_query.to_string(),
            variables,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AdapterError::Connection(
                    "mock transport has no scripted response left".to_string(),
                ))
            })
    }
}
