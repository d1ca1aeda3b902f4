//! # OstrichDB assistant
//!
//! Sends natural-language prompts to a chat model primed with OstrichDB's
//! documentation, keeps every raw reply on disk, and turns operation replies
//! into requests for [`ostrichdb_client::OstrichDBHttpClient`].
//!
//! ```rust,no_run
//! use ostrichdb_agent::*;
//! use ostrichdb_client::OstrichDBHttpClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> AgentResult<()> {
//! let system = load_system_instructions("agent/system.txt").await?;
//! let docs = load_training_docs("agent/docs", &DEFAULT_DOC_FILES).await?;
//! let assistant = Assistant::new(Arc::new(OllamaBackend::from_env()?), system)
//!     .with_docs(docs)
//!     .with_store(ResponseStore::new("agent/responses"));
//!
//! let client = OstrichDBHttpClient::local_node()?;
//! let outcome = assistant
//!     .turn("create a users collection with an admins cluster", &client, false)
//!     .await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

mod assistant;
mod docs;
mod error;
pub mod llm;
pub mod plan;
mod store;
mod types;

pub use {
    assistant::{Assistant, TurnOutcome},
    docs::{load_system_instructions, load_training_docs, DEFAULT_DOC_FILES},
    error::{AgentError, AgentResult},
    llm::{ChatBackend, ChatMessage, ChatRole, OllamaBackend, OpenAiBackend},
    plan::{execute_plan, plan_operations, PlanOutcome, PlannedRequest},
    store::ResponseStore,
    types::{
        strip_code_fences, AgentGeneralInformationQueryResponse, AgentOperationQueryResponse,
        AgentReply, GENERAL_INFORMATION_MARKER,
    },
};
