//! Cluster-level calls: status, resources, backup schedule, log, ACL.

use crate::api::{ApiError, Envelope, ProxmoxClient, Result};

impl ProxmoxClient {
    /// Read cluster status information.
    pub async fn cluster_status(&self) -> Result<Envelope> {
        self.get("cluster/status").await
    }

    /// Read cluster resources (nodes, guests, storage).
    pub async fn cluster_resources(&self) -> Result<Envelope> {
        self.get("cluster/resources").await
    }

    /// List the vzdump backup schedule.
    pub async fn cluster_backup_schedule(&self) -> Result<Envelope> {
        self.get("cluster/backup").await
    }

    /// Read the cluster log.
    pub async fn cluster_log(&self) -> Result<Envelope> {
        self.get("cluster/log").await
    }

    /// List cluster nodes.
    pub async fn node_list(&self) -> Result<Envelope> {
        self.get("nodes").await
    }

    /// Read the cluster access control list.
    pub async fn cluster_acl(&self) -> Result<Envelope> {
        self.get("access/acl").await
    }

    /// Next free VMID on the cluster, as returned by `cluster/nextid`.
    pub async fn next_vmid(&self) -> Result<String> {
        let envelope = self.get("cluster/nextid").await?;
        envelope
            .data
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Protocol {
                code: envelope.http_status.code,
                detail: "cluster/nextid did not return an id string".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{auth_ok, data_ok, MockServer};
    use crate::api::ProxmoxClient;

    #[tokio::test]
    async fn next_vmid_unwraps_the_id_string() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            data_ok(r#""105""#),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        assert_eq!(client.next_vmid().await.unwrap(), "105");
        assert_eq!(
            server.requests().await[1].path,
            "/api2/json/cluster/nextid"
        );
    }
}
