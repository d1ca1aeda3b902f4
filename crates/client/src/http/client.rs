//! Core HTTP client struct, constructors and the shared request path

use {
    super::{
        concurrency_limiter::{ConcurrencyLimitConfig, ConcurrencyLimiter},
        response::{read_response, OstrichResponse},
        url_builder::UrlBuilder,
    },
    crate::{
        debug::{OperationEntry, OperationLog, RequestLogger},
        Level, Method, OstrichError, OstrichResult, RecordParams, ResourcePath, ServerVersion,
    },
    ::tracing::{debug, instrument, warn},
    derive_getters::Getters,
    reqwest::{header::CONTENT_TYPE, Client},
    std::{
        path::Path,
        sync::{Arc, RwLock},
        time::{Duration, Instant},
    },
    tap::TapFallible,
    url::Url,
};

/// Address of a locally running OstrichDB server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8042";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const HOST_ENV: &str = "OSTRICHDB_HOST";
pub const TIMEOUT_ENV: &str = "OSTRICHDB_TIMEOUT_SECS";

#[derive(Clone, Debug, Getters)]
pub struct OstrichDBHttpClient {
    pub endpoint: Url,
    #[getter(skip)]
    pub(crate) http: Client,
    /// Per-request timeout
    timeout: Duration,
    /// Shared read/write limits for this client's host
    limiter: ConcurrencyLimiter,
    /// Recent requests, newest last
    operation_log: OperationLog,
    #[getter(skip)]
    request_logger: Arc<RwLock<Option<RequestLogger>>>,
}

impl OstrichDBHttpClient {
    /// Creates a client for a server on `http://localhost:8042`.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use ostrichdb_client::OstrichDBHttpClient;
    /// # async fn example() -> ostrichdb_client::OstrichResult<()> {
    /// let client = OstrichDBHttpClient::local_node()?;
    /// println!("{}", client.version().await?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn local_node() -> OstrichResult<Self> {
        Self::new(Url::parse(DEFAULT_ENDPOINT)?)
    }

    /// Creates a client for the given server root with the default timeout.
    /// Concurrency limits are picked up from the environment if set.
    pub fn new(endpoint: Url) -> OstrichResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> OstrichResult<Self> {
        if endpoint.cannot_be_a_base() {
            return Err(OstrichError::validation(format!(
                "endpoint {} cannot carry a path",
                endpoint
            )));
        }

        let limit_config = ConcurrencyLimitConfig::from_env().unwrap_or_default();
        let limiter = ConcurrencyLimiter::for_host(&host_key(&endpoint), &limit_config);

        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            endpoint,
            timeout,
            limiter,
            operation_log: OperationLog::default(),
            request_logger: Arc::new(RwLock::new(None)),
        })
    }

    /// Creates a client from `OSTRICHDB_HOST` and `OSTRICHDB_TIMEOUT_SECS`,
    /// falling back to the local defaults.
    pub fn from_env() -> OstrichResult<Self> {
        let host = std::env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let timeout = match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!("ignoring {}={:?}: not a number of seconds", TIMEOUT_ENV, raw);
                    DEFAULT_TIMEOUT
                }
            },
            Err(_) => DEFAULT_TIMEOUT,
        };
        Self::with_timeout(Url::parse(&host)?, timeout)
    }

    /// Use explicit concurrency limits for this client's host.
    ///
    /// Limiters are shared per host: if another client already created the
    /// limiter for this host, that one is reused.
    pub fn with_concurrency_limit(mut self, config: ConcurrencyLimitConfig) -> Self {
        self.limiter = ConcurrencyLimiter::for_host(&host_key(&self.endpoint), &config);
        self
    }

    /// Keep at most `size` entries in the in-memory operation log.
    pub fn with_operation_log_size(mut self, size: usize) -> Self {
        self.operation_log = OperationLog::new(size);
        self
    }

    /// Append every request to a JSON-lines file at `path`.
    pub async fn enable_request_log<P: AsRef<Path>>(&self, path: P) -> OstrichResult<()> {
        let logger = RequestLogger::new(path).await?;
        if let Ok(mut guard) = self.request_logger.write() {
            *guard = Some(logger);
        }
        Ok(())
    }

    pub fn disable_request_log(&self) {
        if let Ok(mut guard) = self.request_logger.write() {
            guard.take();
        }
    }

    pub(crate) fn build_url(&self) -> UrlBuilder {
        UrlBuilder::new(&self.endpoint)
    }

    /// Full URL a request would be sent to, without sending it.
    pub fn url_for(
        &self,
        method: Method,
        path: &ResourcePath,
        params: &RecordParams,
    ) -> OstrichResult<String> {
        Ok(self
            .build_url()
            .resource(path)
            .record_params(method, path, params)?
            .build())
    }

    /// Fetch the server version (`GET /version`).
    #[instrument(name = "ostrich.version", skip(self), err)]
    pub async fn version(&self) -> OstrichResult<ServerVersion> {
        let uri = self.build_url().endpoint("version").build();
        let res = self.send(Method::Get, uri, "/version".to_string(), None).await?;
        Ok(ServerVersion::from_body(&res.body))
    }

    pub async fn is_running(&self) -> bool {
        self.version().await.is_ok()
    }

    /// Issue one request against a collection, cluster or record.
    ///
    /// Record parameters are only sent where the method needs them; a POST or
    /// PUT on a record without the required parameters fails before any I/O.
    #[instrument(
        name = "ostrich.request",
        skip_all,
        fields(method = %method, path = %path),
        err
    )]
    pub async fn execute(
        &self,
        method: Method,
        path: &ResourcePath,
        params: &RecordParams,
    ) -> OstrichResult<OstrichResponse> {
        let uri = self.url_for(method, path, params)?;
        self.send(method, uri, path.to_string(), Some(path.level()))
            .await
    }

    async fn send(
        &self,
        method: Method,
        uri: String,
        relative_path: String,
        level: Option<Level>,
    ) -> OstrichResult<OstrichResponse> {
        let start_time = Instant::now();
        let _permit = self.limiter.acquire(method).await;

        debug!("📡 {} {}", method, &uri);

        let result = match self
            .http
            .request(method.into(), uri.as_str())
            .header(CONTENT_TYPE, "text/plain")
            .send()
            .await
        {
            Ok(res) => read_response(method, res).await,
            Err(err) => Err(OstrichError::from(err)),
        }
        .tap_err(|err| debug!("📭 {} {} failed: {}", method, &uri, err));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let entry = OperationEntry::new(method, relative_path, level);
        let entry = match &result {
            Ok(res) => {
                debug!("📨 {} {} -> {} in {}ms", method, &uri, res.status, duration_ms);
                entry.success(res.status.as_u16(), duration_ms)
            }
            Err(err) => entry.failure(
                err.status().map(|s| s.as_u16()),
                err.to_string(),
                duration_ms,
            ),
        };
        self.record(entry).await;

        result
    }

    async fn record(&self, entry: OperationEntry) {
        let logger = self
            .request_logger
            .read()
            .ok()
            .and_then(|guard| guard.clone());
        if let Some(logger) = logger {
            logger.log(&entry).await;
        }
        self.operation_log.push(entry);
    }
}

/// Key limiters by `host:port` so clients with different path prefixes on the
/// same server share permits.
fn host_key(endpoint: &Url) -> String {
    format!(
        "{}:{}",
        endpoint.host_str().unwrap_or_default(),
        endpoint.port_or_known_default().unwrap_or_default()
    )
}
