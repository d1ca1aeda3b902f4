//! System instructions and training documentation for the assistant.

use crate::{AgentError, AgentResult};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_DOC_FILES: [&str; 4] = ["architecture.md", "schema.md", "rules.md", "fun_facts.md"];

const DOCS_HEADER: &str = "# OSTRICHDB OFFICIAL DOCUMENTATION\n\n";
const DOCS_FOOTER: &str = "\n\n## IMPORTANT INSTRUCTION\nThe above documentation contains ALL the information about OstrichDB. Do not make up or infer additional information.";

pub async fn load_system_instructions(path: impl AsRef<Path>) -> AgentResult<String> {
    let path = path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .map_err(AgentError::io(format!(
            "reading system instructions {}",
            path.display()
        )))
}

/// Concatenate `files` from `dir` into one documentation message, in order.
pub async fn load_training_docs<S: AsRef<str>>(dir: impl AsRef<Path>, files: &[S]) -> AgentResult<String> {
    let dir = dir.as_ref();
    let mut docs = String::from(DOCS_HEADER);

    for file in files {
        let file = file.as_ref();
        let path = dir.join(file);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(AgentError::io(format!("reading training doc {}", path.display())))?;
        debug!("loaded training doc {} ({} bytes)", file, content.len());

        docs.push_str("\n\n## DOCUMENTATION SECTION: ");
        docs.push_str(file);
        docs.push_str("\n\n");
        docs.push_str(&content);
    }

    docs.push_str(DOCS_FOOTER);
    Ok(docs)
}
