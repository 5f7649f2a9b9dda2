//! Storage calls: datastore configuration and content.

use crate::api::{Envelope, FormData, ProxmoxClient, Result};

impl ProxmoxClient {
    /// Read one storage's configuration.
    pub async fn storage_config(&self, storage: &str) -> Result<Envelope> {
        self.get(&format!("storage/{storage}")).await
    }

    /// Update a storage configuration.
    pub async fn update_storage(&self, storage: &str, params: &FormData) -> Result<Envelope> {
        self.put(&format!("storage/{storage}"), Some(params)).await
    }

    /// Delete a storage configuration.
    pub async fn delete_storage(&self, storage: &str) -> Result<Envelope> {
        self.delete(&format!("storage/{storage}"), None).await
    }

    /// List a storage's content on one node.
    pub async fn node_storage_content(&self, node: &str, storage: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/storage/{storage}/content")).await
    }

    /// Allocate a disk volume, e.g. for a specific VM. `params` carries
    /// `filename`, `size`, and `vmid`.
    pub async fn allocate_volume(
        &self,
        node: &str,
        storage: &str,
        params: &FormData,
    ) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/storage/{storage}/content"), Some(params)).await
    }

    /// Read one volume's attributes.
    pub async fn volume_info(
        &self,
        node: &str,
        storage: &str,
        volume: &str,
    ) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/storage/{storage}/content/{volume}")).await
    }
}
