//! Per-node calls: status, services, DNS, tasks, networking.

use crate::api::{Envelope, FormData, ProxmoxClient, Result};

impl ProxmoxClient {
    /// Read node status.
    pub async fn node_status(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/status")).await
    }

    /// Read node configuration.
    pub async fn node_config(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/config")).await
    }

    /// Read DNS settings.
    pub async fn node_dns(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/dns")).await
    }

    /// Set the node's DNS search domain.
    pub async fn set_node_dns_domain(&self, node: &str, domain: &str) -> Result<Envelope> {
        let body = vec![("search".to_string(), domain.to_string())];
        self.put(&format!("nodes/{node}/dns"), Some(&body)).await
    }

    /// Read the system log.
    pub async fn node_syslog(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/syslog")).await
    }

    /// List services on the node.
    pub async fn node_services(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/services")).await
    }

    /// Read one service's properties.
    pub async fn node_service_state(&self, node: &str, service: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/services/{service}/state")).await
    }

    /// Status of all datastores visible from the node.
    pub async fn node_storage_index(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/storage")).await
    }

    /// Set the node's subscription key.
    pub async fn set_node_subscription_key(&self, node: &str, key: &str) -> Result<Envelope> {
        let body = vec![("key".to_string(), key.to_string())];
        self.put(&format!("nodes/{node}/subscription"), Some(&body)).await
    }

    /// Set the node's timezone.
    pub async fn set_node_timezone(&self, node: &str, timezone: &str) -> Result<Envelope> {
        let body = vec![("timezone".to_string(), timezone.to_string())];
        self.put(&format!("nodes/{node}/time"), Some(&body)).await
    }

    // Tasks. Long-running operations return a UPID; these read it back.

    /// Task list for the node (finished tasks).
    pub async fn node_tasks(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/tasks")).await
    }

    /// Directory index for one task.
    pub async fn task_by_upid(&self, node: &str, upid: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/tasks/{upid}")).await
    }

    /// Read a task's status. The payload carries its own `status` field
    /// (`running`/`stopped`), separate from the envelope's HTTP metadata.
    pub async fn task_status(&self, node: &str, upid: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/tasks/{upid}/status")).await
    }

    /// Read a task's log.
    pub async fn task_log(&self, node: &str, upid: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/tasks/{upid}/log")).await
    }

    // Networking.

    /// List available networks on the node.
    pub async fn node_networks(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/network")).await
    }

    /// Read one network device's configuration.
    pub async fn node_interface(&self, node: &str, iface: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/network/{iface}")).await
    }

    /// Create a network device.
    pub async fn create_node_network(&self, node: &str, params: &FormData) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/network"), Some(params)).await
    }

    /// Apply pending network configuration changes.
    pub async fn reload_node_networks(&self, node: &str) -> Result<Envelope> {
        self.put(&format!("nodes/{node}/network"), None).await
    }

    /// Update one interface's configuration.
    pub async fn update_node_interface(
        &self,
        node: &str,
        iface: &str,
        params: &FormData,
    ) -> Result<Envelope> {
        self.put(&format!("nodes/{node}/network/{iface}"), Some(params)).await
    }

    /// Delete a network device configuration.
    pub async fn delete_node_interface(&self, node: &str, iface: &str) -> Result<Envelope> {
        self.delete(&format!("nodes/{node}/network/{iface}"), None).await
    }
}
