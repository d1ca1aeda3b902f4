//! Payloads the assistant model is instructed to answer with.

use crate::{AgentError, AgentResult};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Present in every general-information reply and in no operation reply.
pub const GENERAL_INFORMATION_MARKER: &str = "is_general_ostrichdb_information_query";

/// Models emit `null` for fields they consider empty; treat it as the default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One requested operation over collections, clusters and records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOperationQueryResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub command: String,
    #[serde(default, deserialize_with = "nullable")]
    pub http_request_method: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_batch_request: bool,
    /// Levels a batch touches: `COLLECTION`, `CLUSTER`, `RECORD`
    #[serde(default, deserialize_with = "nullable")]
    pub batch_data_structures: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub total_collection_count: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub total_cluster_count: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub total_record_count: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub clusters_per_collection: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub records_per_cluster: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub collection_names: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cluster_names: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub record_names: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub record_types: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub record_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentGeneralInformationQueryResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub is_general_ostrichdb_information_query: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub general_information_query_response: String,
}

/// A classified model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    General(Vec<AgentGeneralInformationQueryResponse>),
    Operations(Vec<AgentOperationQueryResponse>),
}

impl AgentReply {
    /// Classify and decode a raw model reply.
    ///
    /// Replies mentioning [`GENERAL_INFORMATION_MARKER`] are general
    /// information; anything else must be operation payloads. Markdown code
    /// fences are stripped and a single object is accepted in place of a
    /// one-element array.
    pub fn parse(raw: &str) -> AgentResult<Self> {
        let json = strip_code_fences(raw);
        if json.contains(GENERAL_INFORMATION_MARKER) {
            Ok(AgentReply::General(one_or_many(json)?))
        } else {
            Ok(AgentReply::Operations(one_or_many(json)?))
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, AgentReply::General(_))
    }
}

fn one_or_many<T: DeserializeOwned>(json: &str) -> AgentResult<Vec<T>> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| AgentError::Parse(format!("{}: {}", e, json)))?;
    let items = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(AgentError::Parse(format!(
                "expected a JSON array or object, got {}",
                other
            )))
        }
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| AgentError::Parse(e.to_string())))
        .collect()
}

/// Drop a surrounding ```` ```json ... ``` ```` fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}
