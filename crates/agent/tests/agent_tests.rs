//! End-to-end assistant turns against in-process chat and OstrichDB servers.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use ostrichdb_agent::*;
use ostrichdb_client::OstrichDBHttpClient;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use url::Url;

type Seen = Arc<Mutex<Vec<Value>>>;

#[derive(Clone)]
struct ChatState {
    reply: String,
    seen: Seen,
}

async fn serve(app: Router) -> anyhow::Result<Url> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Url::parse(&format!("http://{}", addr))?)
}

/// Chat server speaking both the Ollama and the OpenAI protocol.
async fn chat_server(reply: &str) -> anyhow::Result<(Url, Seen)> {
    let seen = Seen::default();
    let state = ChatState {
        reply: reply.to_string(),
        seen: seen.clone(),
    };

    let app = Router::new()
        .route(
            "/api/chat",
            post(|State(s): State<ChatState>, Json(body): Json<Value>| async move {
                s.seen.lock().unwrap().push(body);
                Json(json!({
                    "model": "ostrichdb1",
                    "message": {"role": "assistant", "content": s.reply},
                    "done": true
                }))
            }),
        )
        .route(
            "/v1/chat/completions",
            post(|State(s): State<ChatState>, req: Request| async move {
                let auth = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                if auth.as_deref() != Some("Bearer test-key") {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
                }
                let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
                    .await
                    .unwrap_or_default();
                s.seen
                    .lock()
                    .unwrap()
                    .push(serde_json::from_slice(&bytes).unwrap_or(Value::Null));
                (
                    StatusCode::OK,
                    Json(json!({
                        "choices": [{"index": 0, "message": {"role": "assistant", "content": s.reply}}]
                    })),
                )
            }),
        )
        .with_state(state);

    Ok((serve(app).await?, seen))
}

/// OstrichDB stand-in that records `METHOD path?query` and fails any path
/// containing `locked`.
async fn ostrich_server() -> anyhow::Result<(Url, Arc<Mutex<Vec<String>>>)> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let state = log.clone();
    let app = Router::new().fallback(move |req: Request| {
        let state = state.clone();
        async move {
            let line = match req.uri().query() {
                Some(q) => format!("{} {}?{}", req.method(), req.uri().path(), q),
                None => format!("{} {}", req.method(), req.uri().path()),
            };
            state.lock().unwrap().push(line);
            if req.uri().path().contains("locked") {
                (StatusCode::CONFLICT, "locked".to_string())
            } else {
                (StatusCode::OK, "ok".to_string())
            }
        }
    });
    Ok((serve(app).await?, log))
}

const BATCH_CREATE: &str = r#"```json
[{
  "command": "CREATE",
  "http_request_method": "POST",
  "is_batch_request": true,
  "batch_data_structures": ["COLLECTION", "CLUSTER", "RECORD"],
  "total_collection_count": 1,
  "total_cluster_count": 2,
  "total_record_count": 2,
  "clusters_per_collection": 2,
  "records_per_cluster": 1,
  "collection_names": ["zoo"],
  "cluster_names": ["birds", "locked"],
  "record_names": ["ostrich", "penguin"],
  "record_types": ["STRING"],
  "record_values": []
}]
```"#;

#[tokio::test]
async fn ollama_turn_executes_plan_in_order() -> anyhow::Result<()> {
    let (chat_url, chat_seen) = chat_server(BATCH_CREATE).await?;
    let (db_url, db_log) = ostrich_server().await?;
    let dir = tempfile::tempdir()?;

    let backend = OllamaBackend::new(chat_url, "ostrichdb1")?;
    let assistant = Assistant::new(Arc::new(backend), "Reply in JSON.")
        .with_docs("# OSTRICHDB OFFICIAL DOCUMENTATION")
        .with_store(ResponseStore::new(dir.path()));
    let client = OstrichDBHttpClient::new(db_url)?;

    let outcome = assistant.turn("build a zoo", &client, false).await?;
    let TurnOutcome::Executed(outcomes) = outcome else {
        panic!("expected an executed plan");
    };

    assert_eq!(
        db_log.lock().unwrap().clone(),
        vec![
            "POST /c/zoo",
            "POST /c/zoo/cl/birds",
            "POST /c/zoo/cl/locked",
            "POST /c/zoo/cl/birds/r/ostrich?type=STRING",
            "POST /c/zoo/cl/locked/r/penguin?type=STRING",
        ]
    );

    // Failures are recorded and the rest of the plan still runs.
    let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_success()).collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|o| o.status == Some(409)));
    assert_eq!(outcomes[0].body.as_deref(), Some("ok"));

    let request = chat_seen.lock().unwrap()[0].clone();
    assert_eq!(request["model"], "ostrichdb1");
    assert_eq!(request["stream"], false);
    assert_eq!(request["messages"].as_array().map(Vec::len), Some(4));
    assert_eq!(request["messages"][3]["content"], "build a zoo");

    let stored = tokio::fs::read_to_string(dir.path().join("0_response.json")).await?;
    assert_eq!(stored, BATCH_CREATE);
    Ok(())
}

#[tokio::test]
async fn openai_turn_answers_general_questions() -> anyhow::Result<()> {
    let (chat_url, chat_seen) = chat_server(
        r#"[{"is_general_ostrichdb_information_query": true,
             "general_information_query_response": "OstrichDB listens on port 8042."}]"#,
    )
    .await?;

    let backend = OpenAiBackend::new(chat_url, "test-key", "gpt-4o-mini")?;
    let assistant = Assistant::new(Arc::new(backend), "Reply in JSON.");
    let client = OstrichDBHttpClient::local_node()?;

    let outcome = assistant.turn("what port?", &client, false).await?;
    let TurnOutcome::Information(answers) = outcome else {
        panic!("expected a general answer");
    };
    assert_eq!(answers, vec!["OstrichDB listens on port 8042."]);
    assert_eq!(chat_seen.lock().unwrap()[0]["model"], "gpt-4o-mini");
    assert!(client.operation_log().is_empty());
    Ok(())
}

#[tokio::test]
async fn backend_errors_surface() -> anyhow::Result<()> {
    let (chat_url, _) = chat_server("[]").await?;

    let backend = OpenAiBackend::new(chat_url, "wrong-key", "gpt-4o-mini")?;
    let err = backend
        .complete(&[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Backend(_)), "{:?}", err);
    assert!(err.to_string().contains("401"));
    Ok(())
}

#[tokio::test]
async fn dry_run_plans_without_sending() -> anyhow::Result<()> {
    let (chat_url, _) = chat_server(
        r#"{"command": "ERASE", "is_batch_request": true,
            "batch_data_structures": ["collection", "cluster"],
            "collection_names": ["zoo"], "cluster_names": ["birds"]}"#,
    )
    .await?;
    let (db_url, db_log) = ostrich_server().await?;

    let assistant = Assistant::new(Arc::new(OllamaBackend::new(chat_url, "ostrichdb1")?), "");
    let client = OstrichDBHttpClient::new(db_url)?;

    let TurnOutcome::Planned(plan) = assistant.turn("drop the zoo", &client, true).await? else {
        panic!("expected a plan");
    };
    let rendered: Vec<_> = plan.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["DELETE /c/zoo/cl/birds", "DELETE /c/zoo"]);
    assert!(db_log.lock().unwrap().is_empty());
    Ok(())
}
