//! Operations on a collection as a whole

use {
    super::{client::OstrichDBHttpClient, response::OstrichResponse},
    crate::{CollectionPath, Method, OstrichResult, RecordParams, ResourcePath},
};

impl OstrichDBHttpClient {
    /// Perform `method` on `/c/{collection}`.
    pub async fn collection_action(
        &self,
        method: Method,
        path: &CollectionPath,
    ) -> OstrichResult<OstrichResponse> {
        self.execute(
            method,
            &ResourcePath::Collection(path.clone()),
            &RecordParams::none(),
        )
        .await
    }

    pub async fn create_collection(&self, path: &CollectionPath) -> OstrichResult<OstrichResponse> {
        self.collection_action(Method::Post, path).await
    }

    /// Fetch the collection's contents as the server renders them.
    pub async fn get_collection(&self, path: &CollectionPath) -> OstrichResult<String> {
        Ok(self.collection_action(Method::Get, path).await?.body)
    }

    pub async fn delete_collection(&self, path: &CollectionPath) -> OstrichResult<OstrichResponse> {
        self.collection_action(Method::Delete, path).await
    }

    /// `HEAD` the collection: `true` on 2xx, `false` on 404.
    pub async fn collection_exists(&self, path: &CollectionPath) -> OstrichResult<bool> {
        super::exists(self.collection_action(Method::Head, path).await)
    }
}
