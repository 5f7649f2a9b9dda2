//! Resource pool calls.

use crate::api::{Envelope, FormData, ProxmoxClient, Result};

impl ProxmoxClient {
    /// List all pools.
    pub async fn list_pools(&self) -> Result<Envelope> {
        self.get("pools").await
    }

    /// Read one pool's content.
    pub async fn pool(&self, poolid: &str) -> Result<Envelope> {
        self.get(&format!("pools/{poolid}")).await
    }

    /// Create a pool. `params` must include `poolid`.
    pub async fn create_pool(&self, params: &FormData) -> Result<Envelope> {
        self.post("pools", Some(params)).await
    }

    /// Update pool membership or comment.
    pub async fn update_pool(&self, poolid: &str, params: &FormData) -> Result<Envelope> {
        self.put(&format!("pools/{poolid}"), Some(params)).await
    }

    /// Delete a pool.
    pub async fn delete_pool(&self, poolid: &str) -> Result<Envelope> {
        self.delete(&format!("pools/{poolid}"), None).await
    }
}
