//! QEMU virtual machine calls: lifecycle, configuration, snapshots.
//!
//! Lifecycle operations (create, start, stop, migrate, ...) are asynchronous
//! on the server; the envelope's payload is the UPID of the spawned task,
//! reachable via [`Envelope::upid`](crate::Envelope::upid) and the task calls
//! in [`nodes`](crate::api::nodes).

use serde_json::Value;

use crate::api::{Envelope, FormData, ProxmoxClient, Result};

impl ProxmoxClient {
    /// List virtual machines on the node.
    pub async fn list_vms(&self, node: &str) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/qemu")).await
    }

    /// Directory index for one virtual machine.
    pub async fn vm_index(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/qemu/{vmid}")).await
    }

    /// Current status of a virtual machine.
    pub async fn vm_status(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/qemu/{vmid}/status/current")).await
    }

    /// Read a virtual machine's configuration.
    pub async fn vm_config(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/qemu/{vmid}/config")).await
    }

    /// Set virtual machine options (cores, memory, disks, ...).
    pub async fn set_vm_options(
        &self,
        node: &str,
        vmid: u32,
        params: &FormData,
    ) -> Result<Envelope> {
        self.put(&format!("nodes/{node}/qemu/{vmid}/config"), Some(params)).await
    }

    /// Create or restore a virtual machine. `params` must include `vmid`.
    pub async fn create_vm(&self, node: &str, params: &FormData) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu"), Some(params)).await
    }

    /// Create a copy of a virtual machine or template.
    pub async fn clone_vm(&self, node: &str, vmid: u32, params: &FormData) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/clone"), Some(params)).await
    }

    /// Destroy the virtual machine and all owned volumes.
    pub async fn delete_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.delete(&format!("nodes/{node}/qemu/{vmid}"), None).await
    }

    /// Start a virtual machine.
    pub async fn start_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/status/start"), None).await
    }

    /// Stop a virtual machine (hard stop).
    pub async fn stop_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/status/stop"), None).await
    }

    /// Shut down a virtual machine via ACPI.
    pub async fn shutdown_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/status/shutdown"), None).await
    }

    /// Reset a virtual machine.
    pub async fn reset_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/status/reset"), None).await
    }

    /// Resume a suspended virtual machine.
    pub async fn resume_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/status/resume"), None).await
    }

    /// Suspend a virtual machine.
    pub async fn suspend_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/status/suspend"), None).await
    }

    /// Migrate a virtual machine to another node. `params` carries `target`
    /// and migration flags such as `online`.
    pub async fn migrate_vm(&self, node: &str, vmid: u32, params: &FormData) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/migrate"), Some(params)).await
    }

    /// Send a monitor command to a virtual machine.
    pub async fn monitor_vm(&self, node: &str, vmid: u32, command: &str) -> Result<Envelope> {
        let body = vec![("command".to_string(), command.to_string())];
        self.post(&format!("nodes/{node}/qemu/{vmid}/monitor"), Some(&body)).await
    }

    /// Create a VNC proxy for a virtual machine.
    pub async fn vncproxy_vm(&self, node: &str, vmid: u32) -> Result<Envelope> {
        self.post(&format!("nodes/{node}/qemu/{vmid}/vncproxy"), None).await
    }

    /// Send a key event to a virtual machine.
    pub async fn send_key_vm(&self, node: &str, vmid: u32, key: &str) -> Result<Envelope> {
        let body = vec![("key".to_string(), key.to_string())];
        self.put(&format!("nodes/{node}/qemu/{vmid}/sendkey"), Some(&body)).await
    }

    /// Unlink (detach) disk images.
    pub async fn unlink_vm_disk(
        &self,
        node: &str,
        vmid: u32,
        params: &FormData,
    ) -> Result<Envelope> {
        self.put(&format!("nodes/{node}/qemu/{vmid}/unlink"), Some(params)).await
    }

    // Snapshots.

    /// List snapshots of a virtual machine.
    ///
    /// The server appends a synthetic `current` entry ("You are here!") to the
    /// list; it is filtered out so callers only see real snapshots.
    pub async fn vm_snapshots(&self, node: &str, vmid: u32) -> Result<Envelope> {
        let mut envelope = self.get(&format!("nodes/{node}/qemu/{vmid}/snapshot")).await?;
        if let Some(list) = envelope.data.as_array_mut() {
            list.retain(|snap| snap.get("name").and_then(Value::as_str) != Some("current"));
        }
        Ok(envelope)
    }

    /// Take a snapshot. `vmstate` includes the RAM state, for running guests.
    pub async fn create_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        snapname: &str,
        description: Option<&str>,
        vmstate: bool,
    ) -> Result<Envelope> {
        let mut body = vec![
            ("snapname".to_string(), snapname.to_string()),
            ("vmstate".to_string(), if vmstate { "1" } else { "0" }.to_string()),
        ];
        if let Some(description) = description {
            body.push(("description".to_string(), description.to_string()));
        }
        self.post(&format!("nodes/{node}/qemu/{vmid}/snapshot"), Some(&body)).await
    }

    /// Read one snapshot's configuration.
    pub async fn vm_snapshot_config(
        &self,
        node: &str,
        vmid: u32,
        snapname: &str,
    ) -> Result<Envelope> {
        self.get(&format!("nodes/{node}/qemu/{vmid}/snapshot/{snapname}/config")).await
    }

    /// Roll the virtual machine back to a snapshot.
    pub async fn rollback_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        snapname: &str,
    ) -> Result<Envelope> {
        self.post(
            &format!("nodes/{node}/qemu/{vmid}/snapshot/{snapname}/rollback"),
            None,
        )
        .await
    }

    /// Delete a snapshot. `force` removes it from the config even if deleting
    /// the disk snapshots fails.
    pub async fn delete_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        snapname: &str,
        force: bool,
    ) -> Result<Envelope> {
        let body = force.then(|| vec![("force".to_string(), "1".to_string())]);
        self.delete(
            &format!("nodes/{node}/qemu/{vmid}/snapshot/{snapname}"),
            body.as_ref(),
        )
        .await
    }
}
