//! Operations on a single cluster within a collection

use {
    super::{client::OstrichDBHttpClient, response::OstrichResponse},
    crate::{ClusterPath, Method, OstrichResult, RecordParams, ResourcePath},
};

impl OstrichDBHttpClient {
    /// Perform `method` on `/c/{collection}/cl/{cluster}`.
    pub async fn cluster_action(
        &self,
        method: Method,
        path: &ClusterPath,
    ) -> OstrichResult<OstrichResponse> {
        self.execute(
            method,
            &ResourcePath::Cluster(path.clone()),
            &RecordParams::none(),
        )
        .await
    }

    pub async fn create_cluster(&self, path: &ClusterPath) -> OstrichResult<OstrichResponse> {
        self.cluster_action(Method::Post, path).await
    }

    pub async fn get_cluster(&self, path: &ClusterPath) -> OstrichResult<String> {
        Ok(self.cluster_action(Method::Get, path).await?.body)
    }

    pub async fn delete_cluster(&self, path: &ClusterPath) -> OstrichResult<OstrichResponse> {
        self.cluster_action(Method::Delete, path).await
    }

    pub async fn cluster_exists(&self, path: &ClusterPath) -> OstrichResult<bool> {
        super::exists(self.cluster_action(Method::Head, path).await)
    }
}
