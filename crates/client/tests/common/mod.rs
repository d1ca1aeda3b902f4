//! In-process stand-in for an OstrichDB server.
//!
//! Records every request it receives and answers with a fixed scheme:
//! - `GET /version` returns `v0.7.0_dev`
//! - any path with a `missing` segment returns 404
//! - any path with a `boom` segment returns 500
//! - `HEAD` returns 200 with an `x-ostrich-path` header
//! - everything else returns 200 with `"{METHOD} {path}"` as the body

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
}

pub struct MockOstrichServer {
    pub url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockOstrichServer {
    pub async fn start() -> anyhow::Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = requests.clone();

        let app = Router::new().fallback(move |req: Request| {
            let state = state.clone();
            async move { respond(&state, req) }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url: Url::parse(&format!("http://{}", addr))?,
            requests,
            handle,
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request was recorded")
    }
}

impl Drop for MockOstrichServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn respond(state: &Mutex<Vec<RecordedRequest>>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    let recorded = RecordedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        query: req.uri().query().map(str::to_string),
        content_type: req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.lock().unwrap().push(recorded);

    let segments: Vec<&str> = path.split('/').collect();
    let (status, body) = if req.method() == Method::GET && path == "/version" {
        (StatusCode::OK, "v0.7.0_dev".to_string())
    } else if segments.contains(&"missing") {
        (StatusCode::NOT_FOUND, format!("{} not found", path))
    } else if segments.contains(&"boom") {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    } else {
        (StatusCode::OK, format!("{} {}", req.method(), path))
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header("x-ostrich-path", path.as_str())
        .body(Body::from(body))
        .unwrap()
}
