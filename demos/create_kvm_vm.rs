//! Create a KVM virtual machine on the next free VMID.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `PVE_HOST`, `PVE_USERNAME`, `PVE_PASSWORD`, `PVE_NODE`, and optionally
//! `PVE_VERIFY_TLS=0` for self-signed clusters.

use anyhow::{Context, Result};
use pve_client::{ConnectOptions, ProxmoxClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = ConnectOptions::from_env().context("missing PVE_* environment variables")?;
    let node = std::env::var("PVE_NODE").context("PVE_NODE is not set")?;

    let client = ProxmoxClient::new(options)?;
    client.login().await?;

    let vmid = client.next_vmid().await?;
    info!(%vmid, "allocating next free id");

    let params: Vec<(String, String)> = [
        ("vmid", vmid.as_str()),
        ("name", "test.example.org"),
        ("description", "test kvm"),
        ("cores", "4"),
        ("sockets", "1"),
        ("memory", "1024"),
        ("scsihw", "virtio-scsi-pci"),
        ("net0", "virtio,bridge=vmbr1"),
        ("ostype", "l26"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let created = client.create_vm(&node, &params).await?;
    println!("{}", created.data);
    println!("{}", created.http_status.code);

    if let Some(upid) = created.upid() {
        let task = client.task_status(&node, upid).await?;
        println!("task: {}", task.data);
    }

    Ok(())
}
