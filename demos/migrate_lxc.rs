//! Migrate an LXC container to another node.
//!
//! Reads `PVE_HOST`, `PVE_USERNAME`, `PVE_PASSWORD`, `PVE_NODE` from the
//! environment; the container id and target node are CLI arguments:
//!
//! ```text
//! cargo run --example migrate_lxc -- 9002 node2
//! ```

use anyhow::{Context, Result};
use pve_client::{ConnectOptions, ProxmoxClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let vmid: u32 = args
        .next()
        .context("usage: migrate_lxc <vmid> <target-node>")?
        .parse()
        .context("vmid must be numeric")?;
    let target = args.next().context("usage: migrate_lxc <vmid> <target-node>")?;

    let options = ConnectOptions::from_env().context("missing PVE_* environment variables")?;
    let node = std::env::var("PVE_NODE").context("PVE_NODE is not set")?;

    let client = ProxmoxClient::new(options)?;
    let migrated = client.migrate_container(&node, vmid, &target).await?;

    println!("{}", migrated.data);
    println!("{}", migrated.http_status.code);

    Ok(())
}
