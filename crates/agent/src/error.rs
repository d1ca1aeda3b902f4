use ostrichdb_client::OstrichError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// The chat backend answered with something other than a completion.
    #[error("chat backend error: {0}")]
    Backend(String),

    #[error("chat backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model's reply was not the JSON payload the instructions ask for.
    #[error("could not parse agent response: {0}")]
    Parse(String),

    /// The payload parsed but does not describe a consistent set of requests.
    #[error("could not plan operation: {0}")]
    Plan(String),

    #[error(transparent)]
    Client(#[from] OstrichError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AgentError {
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
