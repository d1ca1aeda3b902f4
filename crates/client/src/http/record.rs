//! Operations on a single record within a cluster

use {
    super::{client::OstrichDBHttpClient, response::OstrichResponse},
    crate::{Method, OstrichResult, RecordParams, RecordPath, RecordType, RecordValue, ResourcePath},
};

impl OstrichDBHttpClient {
    /// Perform `method` on `/c/{collection}/cl/{cluster}/r/{record}`.
    ///
    /// POST sends `?type=`, PUT sends `?type=&value=`; the other methods send
    /// no parameters.
    pub async fn record_action(
        &self,
        method: Method,
        path: &RecordPath,
        params: &RecordParams,
    ) -> OstrichResult<OstrichResponse> {
        self.execute(method, &ResourcePath::Record(path.clone()), params)
            .await
    }

    /// Create an empty record of the given type.
    pub async fn create_record(
        &self,
        path: &RecordPath,
        record_type: RecordType,
    ) -> OstrichResult<OstrichResponse> {
        self.record_action(Method::Post, path, &RecordParams::typed(record_type))
            .await
    }

    /// Set a record's type and value, creating it if the server allows.
    pub async fn set_record(
        &self,
        path: &RecordPath,
        record_type: RecordType,
        value: impl Into<RecordValue>,
    ) -> OstrichResult<OstrichResponse> {
        self.record_action(
            Method::Put,
            path,
            &RecordParams::with_value(record_type, value),
        )
        .await
    }

    pub async fn get_record(&self, path: &RecordPath) -> OstrichResult<String> {
        Ok(self
            .record_action(Method::Get, path, &RecordParams::none())
            .await?
            .body)
    }

    pub async fn delete_record(&self, path: &RecordPath) -> OstrichResult<OstrichResponse> {
        self.record_action(Method::Delete, path, &RecordParams::none())
            .await
    }

    pub async fn record_exists(&self, path: &RecordPath) -> OstrichResult<bool> {
        super::exists(
            self.record_action(Method::Head, path, &RecordParams::none())
                .await,
        )
    }
}
