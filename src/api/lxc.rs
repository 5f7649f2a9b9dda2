//! LXC container calls: lifecycle, configuration, migration.

use crate::api::{Envelope, FormData, ProxmoxClient, Result};

impl ProxmoxClient {
    /// List containers on the node.
    pub async fn list_containers(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/lxc")).await
    }

    /// Directory index for one container.
    pub async fn container_index(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/lxc/{vmid}")).await
    }

    /// Current status of a container.
    pub async fn container_status(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/lxc/{vmid}/status/current")).await
    }

    /// Read a container's configuration.
    pub async fn container_config(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/lxc/{vmid}/config")).await
    }

    /// Set container options.
    pub async fn set_container_options(
        &self,
        node: &str,
        vmid: u32,
        params: &FormData,
    ) -> Result<Envelope> {
        self.put(&format!("nodes/{node}/lxc/{vmid}/config"), Some(params)).await
    }

    /// Create or restore a container. `params` must include `vmid` and
    /// `ostemplate`.
    pub async fn create_container(&self, node: &str, params: &FormData) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/lxc"), Some(params)).await
    }

    /// Start a container.
    pub async fn start_container(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/lxc/{vmid}/status/start"), None).await
    }

    /// Stop a container (hard stop).
    pub async fn stop_container(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/lxc/{vmid}/status/stop"), None).await
    }

    /// Shut down a container.
    pub async fn shutdown_container(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/lxc/{vmid}/status/shutdown"), None).await
    }

    /// Migrate the container to another node. Spawns a migration task.
    pub async fn migrate_container(
        &self,
        node: &str,
        vmid: u32,
        target: &str,
    ) -> Result<Envelope> {
        let body = vec![("target".to_string(), target.to_string())];
        self.post(&format!("nodes/{node}/lxc/{vmid}/migrate"), Some(&body)).await
    }

    /// Delete the container.
    pub async fn delete_container(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.delete(&format!("nodes/{node}/lxc/{vmid}"), None).await
    }
}
