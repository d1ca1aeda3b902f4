use crate::{
    plan::{execute_plan, plan_operations, PlanOutcome, PlannedRequest},
    AgentReply, AgentResult, ChatBackend, ChatMessage, ResponseStore,
};
use ostrichdb_client::OstrichDBHttpClient;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const DOCS_PREFIX: &str = "Here is the OstrichDB documentation:\n\n";
const DOCS_ACK: &str =
    "I've received the OstrichDB documentation and will use it to answer questions.";

/// Natural-language front end: prompt in, classified reply out.
#[derive(Clone)]
pub struct Assistant {
    backend: Arc<dyn ChatBackend>,
    store: Option<ResponseStore>,
    system_prompt: String,
    docs: Option<String>,
}

/// What a turn produced.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Answers to general questions about OstrichDB.
    Information(Vec<String>),
    /// Requests that would have been sent (dry run).
    Planned(Vec<PlannedRequest>),
    Executed(Vec<PlanOutcome>),
}

impl Assistant {
    pub fn new(backend: Arc<dyn ChatBackend>, system_prompt: impl Into<String>) -> Self {
        Self {
            backend,
            store: None,
            system_prompt: system_prompt.into(),
            docs: None,
        }
    }

    /// Send `docs` ahead of every prompt.
    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    /// Keep every raw reply in `store`.
    pub fn with_store(mut self, store: ResponseStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn messages(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt.as_str())];
        if let Some(docs) = &self.docs {
            messages.push(ChatMessage::user(format!("{}{}", DOCS_PREFIX, docs)));
            messages.push(ChatMessage::assistant(DOCS_ACK));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Complete `prompt`, store the raw reply and classify it.
    #[instrument(name = "agent.ask", skip_all, fields(backend = %self.backend.name()), err)]
    pub async fn ask(&self, prompt: &str) -> AgentResult<AgentReply> {
        let raw = self.backend.complete(&self.messages(prompt)).await?;
        debug!("assistant replied with {} bytes", raw.len());

        if let Some(store) = &self.store {
            // A reply that cannot be stored is still usable.
            if let Err(err) = store.store(&raw).await {
                warn!("could not store assistant reply: {}", err);
            }
        }
        AgentReply::parse(&raw)
    }

    /// Act on a reply: general answers are returned as text, operations are
    /// planned and, unless `dry_run`, sent in order through `client`.
    pub async fn run(
        &self,
        reply: AgentReply,
        client: &OstrichDBHttpClient,
        dry_run: bool,
    ) -> AgentResult<TurnOutcome> {
        let ops = match reply {
            AgentReply::General(answers) => {
                return Ok(TurnOutcome::Information(
                    answers
                        .into_iter()
                        .map(|a| a.general_information_query_response)
                        .collect(),
                ))
            }
            AgentReply::Operations(ops) => ops,
        };

        let plan = plan_operations(&ops)?;
        info!("planned {} request(s)", plan.len());
        if dry_run {
            return Ok(TurnOutcome::Planned(plan));
        }
        Ok(TurnOutcome::Executed(execute_plan(client, &plan).await))
    }

    /// [`ask`](Self::ask) followed by [`run`](Self::run).
    pub async fn turn(
        &self,
        prompt: &str,
        client: &OstrichDBHttpClient,
        dry_run: bool,
    ) -> AgentResult<TurnOutcome> {
        let reply = self.ask(prompt).await?;
        self.run(reply, client, dry_run).await
    }
}
