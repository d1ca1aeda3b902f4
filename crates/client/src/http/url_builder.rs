//! URL building utilities for OstrichDB API endpoints

use crate::{Method, OstrichResult, RecordParams, ResourcePath};
use url::Url;

/// Centralized URL builder for OstrichDB API endpoints.
/// Path segments and query values are percent-encoded as they are added.
#[derive(Debug)]
pub struct UrlBuilder<'a> {
    endpoint: &'a Url,
    parts: Vec<String>,
    query_params: Vec<(String, String)>,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(endpoint: &'a Url) -> Self {
        Self {
            endpoint,
            parts: Vec::new(),
            query_params: Vec::new(),
        }
    }

    /// Add a fixed endpoint segment (e.g. `version`)
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.parts.push(endpoint.to_string());
        self
    }

    /// Add every segment of a collection, cluster or record path
    pub fn resource(mut self, path: &ResourcePath) -> Self {
        self.parts.extend(
            path.segments()
                .into_iter()
                .map(|s| urlencoding::encode(s).into_owned()),
        );
        self
    }

    /// Add a query parameter with URL encoding
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params
            .push((key.to_string(), urlencoding::encode(value).into_owned()));
        self
    }

    /// Add the record `type`/`value` parameters the method requires.
    /// Collection and cluster paths never carry parameters.
    pub fn record_params(
        mut self,
        method: Method,
        path: &ResourcePath,
        params: &RecordParams,
    ) -> OstrichResult<Self> {
        if let ResourcePath::Record(_) = path {
            for (key, value) in params.query_for(method)? {
                self = self.query(key, &value);
            }
        }
        Ok(self)
    }

    /// Build the final URL string
    pub fn build(self) -> String {
        let root = self.endpoint.as_str().trim_end_matches('/');
        let mut url = format!("{}/{}", root, self.parts.join("/"));

        if !self.query_params.is_empty() {
            let query_string = self
                .query_params
                .into_iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query_string);
        }

        url
    }
}
