//! Time-boxed, connection-scoped schema cache
//!
//! One entry per connection domain. A stored snapshot is served while it is
//! younger than the TTL and was fetched for the same domain; otherwise it is
//! replaced wholesale with a fresh fetch. Refresh is idempotent, so two
//! callers racing a refresh may both fetch and both overwrite without harm.

use chrono::Utc;
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::config::ConnectionConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::schema::fetcher::SchemaFetcher;
use crate::schema::types::{CachedSchema, ObjectSchema};
use crate::transport::Transport;

/// Per-domain schema cache, passed by handle into every call that needs schema
#[derive(Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<String, CachedSchema>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the schema snapshot for the connection, fetching when the
    /// stored entry is missing, stale, from another domain, or when the
    /// caller demands a fresh fetch.
    pub async fn get(
        &self,
        transport: &dyn Transport,
        config: &ConnectionConfig,
        force_refresh: bool,
    ) -> AdapterResult<CachedSchema> {
        if !force_refresh {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&config.domain) {
                if entry.is_fresh(Utc::now(), &config.domain) {
                    debug!("schema cache hit for domain {}", config.domain);
                    return Ok(entry.clone());
                }
            }
        }

        // The lock is not held across the fetch; last fetch wins.
        info!("refreshing schema for domain {}", config.domain);
        let objects = SchemaFetcher::fetch(transport).await?;
        let entry = CachedSchema {
            objects,
            cached_at: Utc::now(),
            domain: config.domain.clone(),
        };
        self.entries
            .lock()
            .await
            .insert(config.domain.clone(), entry.clone());
        Ok(entry)
    }

    /// Resolve one object schema by singular or plural name.
    pub async fn object(
        &self,
        transport: &dyn Transport,
        config: &ConnectionConfig,
        name: &str,
        force_refresh: bool,
    ) -> AdapterResult<ObjectSchema> {
        let schema = self.get(transport, config, force_refresh).await?;
        schema.object(name).cloned().ok_or_else(|| {
            AdapterError::Schema(format!(
                "object '{}' is not present in the discovered schema",
                name
            ))
        })
    }

    /// Seed an entry directly, bypassing the fetcher.
    #[cfg(test)]
    pub(crate) async fn insert(&self, entry: CachedSchema) {
        self.entries
            .lock()
            .await
            .insert(entry.domain.clone(), entry);
    }
}
