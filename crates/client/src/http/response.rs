//! Response capture for the HTTP client

use {
    crate::{Method, OstrichError, OstrichResult},
    ::tracing::{instrument, trace},
    reqwest::{header::HeaderMap, Response, StatusCode},
    std::collections::BTreeMap,
};

/// Outcome of a successful request: status, headers and the body as text.
///
/// Bodies are opaque to the client. HEAD responses carry no body; their
/// headers are the payload.
#[derive(Debug, Clone)]
pub struct OstrichResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl OstrichResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Headers as sorted name/value pairs; values that are not visible ASCII
    /// are skipped.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body parsed as JSON, when the server happened to send JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Turn a raw `reqwest` response into an [`OstrichResponse`], or a
/// [`OstrichError::Status`] for anything outside 2xx.
#[instrument(
    name = "ostrich.response.read",
    skip_all,
    fields(method = %method, status = %res.status()),
    err
)]
pub(crate) async fn read_response(method: Method, res: Response) -> OstrichResult<OstrichResponse> {
    let status = res.status();
    let url = res.url().to_string();
    let headers = res.headers().clone();

    let body = if method == Method::Head {
        String::new()
    } else {
        res.text().await?
    };

    trace!("[OstrichDBHttpClient] {} {} -> {}: {}", method, url, status, body);

    if !status.is_success() {
        return Err(OstrichError::Status {
            method,
            url,
            status,
            body,
        });
    }

    Ok(OstrichResponse {
        method,
        url,
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    fn response(body: &str) -> OstrichResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert("x-ostrich-count", HeaderValue::from_static("3"));
        OstrichResponse {
            method: Method::Get,
            url: "http://localhost:8042/c/users".to_string(),
            status: StatusCode::OK,
            headers,
            body: body.to_string(),
        }
    }

    #[test]
    fn header_map_is_sorted() {
        let res = response("");
        let names: Vec<_> = res.header_map().into_keys().collect();
        assert_eq!(names, vec!["content-type", "x-ostrich-count"]);
        assert_eq!(res.header("X-Ostrich-Count"), Some("3"));
    }

    #[test]
    fn json_body_is_optional() {
        assert!(response("plain words").json().is_none());
        assert_eq!(
            response(r#"{"records":2}"#).json().unwrap()["records"],
            serde_json::json!(2)
        );
    }
}
