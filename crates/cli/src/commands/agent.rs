//! Interactive and single-shot assistant commands

use super::Output;
use crate::formatter::{format_outcomes, format_plan};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use ostrichdb_agent::{
    load_system_instructions, load_training_docs, Assistant, ChatBackend, OllamaBackend,
    OpenAiBackend, ResponseStore, TurnOutcome, DEFAULT_DOC_FILES,
};
use ostrichdb_client::OstrichDBHttpClient;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Used when no system instructions file is given.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are OstrichDB AI, the assistant for the OstrichDB database. OstrichDB stores records inside clusters inside collections.
Answer only from the OstrichDB documentation you are given. Reply with JSON only, no prose and no code fences.
For questions about OstrichDB itself reply with an array of objects with the fields "is_general_ostrichdb_information_query" (true) and "general_information_query_response" (your answer).
For requests to create, fetch, update, delete or check data reply with an array of objects with the fields "command", "http_request_method", "is_batch_request", "batch_data_structures", "total_collection_count", "total_cluster_count", "total_record_count", "clusters_per_collection", "records_per_cluster", "collection_names", "cluster_names", "record_names", "record_types" and "record_values".
Record types are one of STRING, INTEGER, FLOAT, BOOLEAN, CHAR, DATE, TIME, DATETIME, UUID, NULL or an array form such as STRING[].
Any information missing from the prompt you may generate yourself."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendKind {
    #[default]
    Ollama,
    Openai,
}

/// Options shared by `ost agent` and `ost ask`
#[derive(Debug, Clone, Args)]
pub struct AgentArgs {
    /// Print the planned requests instead of sending them
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Chat backend to use
    #[arg(long, value_enum, env = "OSTRICHDB_AGENT_BACKEND", default_value_t = BackendKind::Ollama)]
    pub backend: BackendKind,

    /// File with system instructions for the model
    #[arg(long, env = "OSTRICHDB_AGENT_SYSTEM")]
    pub system: Option<PathBuf>,

    /// Directory holding architecture.md, schema.md, rules.md and fun_facts.md
    #[arg(long, env = "OSTRICHDB_AGENT_DOCS")]
    pub docs: Option<PathBuf>,

    /// Directory where every raw reply is kept as N_response.json
    #[arg(long, env = "OSTRICHDB_AGENT_RESPONSES", default_value = "responses")]
    pub responses: PathBuf,

    /// Do not keep raw replies
    #[arg(long)]
    pub no_store: bool,
}

async fn build_assistant(args: &AgentArgs) -> Result<Assistant> {
    let backend: Arc<dyn ChatBackend> = match args.backend {
        BackendKind::Ollama => Arc::new(OllamaBackend::from_env()?),
        BackendKind::Openai => Arc::new(OpenAiBackend::from_env()?),
    };

    let system = match &args.system {
        Some(path) => load_system_instructions(path).await?,
        None => DEFAULT_SYSTEM_PROMPT.to_string(),
    };

    let mut assistant = Assistant::new(backend, system);
    if let Some(dir) = &args.docs {
        let docs = load_training_docs(dir, &DEFAULT_DOC_FILES)
            .await
            .context("Failed to load training documentation")?;
        info!("Loaded {} bytes of documentation from {:?}", docs.len(), dir);
        assistant = assistant.with_docs(docs);
    }
    if !args.no_store {
        assistant = assistant.with_store(ResponseStore::new(&args.responses));
    }
    Ok(assistant)
}

async fn turn(
    assistant: &Assistant,
    client: &OstrichDBHttpClient,
    prompt: &str,
    dry_run: bool,
    output: &Output,
) -> Result<()> {
    match assistant.turn(prompt, client, dry_run).await? {
        TurnOutcome::Information(answers) => {
            for answer in answers {
                println!("{}", answer);
            }
        }
        TurnOutcome::Planned(plan) => {
            println!("{}", format_plan(&plan, output.format, output.colorize));
        }
        TurnOutcome::Executed(outcomes) => {
            println!("{}", format_outcomes(&outcomes, output.format, output.colorize));
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            if failed > 0 {
                warn!("{} of {} request(s) failed", failed, outcomes.len());
            }
        }
    }
    Ok(())
}

pub async fn run_ask(
    client: &OstrichDBHttpClient,
    prompt: &str,
    args: &AgentArgs,
    output: &Output,
) -> Result<()> {
    let assistant = build_assistant(args).await?;
    turn(&assistant, client, prompt, args.dry_run, output).await
}

/// Read prompts until `exit` or end of input. A failed turn is reported and
/// the loop goes on.
pub async fn run_agent(client: &OstrichDBHttpClient, args: &AgentArgs, output: &Output) -> Result<()> {
    let assistant = build_assistant(args).await?;

    eprintln!(
        "OstrichDB assistant ({}{}). Type 'exit' to quit.",
        assistant.backend_name(),
        if args.dry_run { ", dry run" } else { "" }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if output.colorize {
            eprint!("{} ", "ost>".bright_cyan().bold());
        } else {
            eprint!("ost> ");
        }
        std::io::stderr().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Err(err) = turn(&assistant, client, prompt, args.dry_run, output).await {
            eprintln!("Error: {:#}", err);
        }
    }

    eprintln!("Goodbye!");
    Ok(())
}
