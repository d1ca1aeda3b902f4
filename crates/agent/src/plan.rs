//! Turning operation payloads into ordered client requests.
//!
//! A payload names collections, clusters and records as flat lists plus the
//! counts that say how the lists nest. Planning rebuilds the tree, picks the
//! method and expands batches into one request per resource.

use crate::{AgentError, AgentOperationQueryResponse, AgentResult};
use ostrichdb_client::{
    ClusterPath, CollectionPath, Level, Method, OstrichDBHttpClient, OstrichResult, RecordParams,
    RecordPath, RecordType, RecordValue, ResourcePath,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

/// One request the assistant wants sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlannedRequest {
    pub method: Method,
    pub path: ResourcePath,
    pub params: RecordParams,
}

impl PlannedRequest {
    fn new(method: Method, path: impl Into<ResourcePath>) -> Self {
        Self {
            method,
            path: path.into(),
            params: RecordParams::none(),
        }
    }
}

impl Display for PlannedRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if self.path.level() == Level::Record {
            if let Some(ty) = &self.params.record_type {
                write!(f, " type={}", ty)?;
            }
            if let Some(value) = &self.params.value {
                write!(f, " value={}", value)?;
            }
        }
        Ok(())
    }
}

/// Result of sending one planned request.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub request: PlannedRequest,
    pub status: Option<u16>,
    pub body: Option<String>,
    pub error: Option<String>,
}

impl PlanOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Plan every payload in order; identical requests keep their first position.
pub fn plan_operations(ops: &[AgentOperationQueryResponse]) -> AgentResult<Vec<PlannedRequest>> {
    let mut seen = HashSet::new();
    let mut plan = Vec::new();
    for op in ops {
        for request in plan_operation(op)? {
            if seen.insert(request.clone()) {
                plan.push(request);
            } else {
                debug!("dropping duplicate request {}", request);
            }
        }
    }
    Ok(plan)
}

fn plan_operation(op: &AgentOperationQueryResponse) -> AgentResult<Vec<PlannedRequest>> {
    let method = resolve_method(op)?;

    let collections = op
        .collection_names
        .iter()
        .map(|name| CollectionPath::new(name))
        .collect::<OstrichResult<Vec<_>>>()
        .map_err(plan_error)?;
    let clusters = assign(
        &collections,
        &op.cluster_names,
        op.clusters_per_collection,
        |collection, name| collection.cluster(name),
    )?;
    let cluster_paths: Vec<ClusterPath> = clusters.iter().map(|(_, c)| c.clone()).collect();
    let records = assign(
        &cluster_paths,
        &op.record_names,
        op.records_per_cluster,
        |cluster, name| cluster.record(name),
    )?;

    let target = if !op.record_names.is_empty() {
        Level::Record
    } else if !op.cluster_names.is_empty() {
        Level::Cluster
    } else if !op.collection_names.is_empty() {
        Level::Collection
    } else {
        return Err(AgentError::Plan(format!(
            "{} names no collection, cluster or record",
            describe(op)
        )));
    };

    check_count("collection", op.total_collection_count, collections.len());
    check_count("cluster", op.total_cluster_count, cluster_paths.len());
    check_count("record", op.total_record_count, records.len());

    let mut levels = vec![target];
    if op.is_batch_request {
        for raw in &op.batch_data_structures {
            let level = parse_level(raw)?;
            if level > target {
                warn!("batch names {} but the payload has no {} names", raw, raw);
                continue;
            }
            if method == Method::Put && target == Level::Record && level != Level::Record {
                warn!("PUT only updates records; skipping the {} level of the batch", raw);
                continue;
            }
            if !levels.contains(&level) {
                levels.push(level);
            }
        }
    }
    levels.sort();
    if method == Method::Delete {
        levels.reverse();
    }

    let record_params = if target == Level::Record {
        record_params(op, method)?
    } else {
        Vec::new()
    };

    let mut plan = Vec::new();
    for level in levels {
        match level {
            Level::Collection => plan.extend(
                collections
                    .iter()
                    .map(|c| PlannedRequest::new(method, c.clone())),
            ),
            Level::Cluster => plan.extend(
                cluster_paths
                    .iter()
                    .map(|c| PlannedRequest::new(method, c.clone())),
            ),
            Level::Record => {
                for (name_index, record) in &records {
                    plan.extend(record_requests(method, record, &record_params[*name_index]));
                }
            }
        }
    }
    Ok(plan)
}

/// Requests for one record. POST only carries the type, so a value given
/// with a create is sent as a PUT right after it.
fn record_requests(
    method: Method,
    record: &RecordPath,
    params: &RecordParams,
) -> Vec<PlannedRequest> {
    match (method, &params.value) {
        (Method::Post, Some(_)) => vec![
            PlannedRequest {
                method: Method::Post,
                path: record.clone().into(),
                params: RecordParams {
                    value: None,
                    ..params.clone()
                },
            },
            PlannedRequest {
                method: Method::Put,
                path: record.clone().into(),
                params: params.clone(),
            },
        ],
        (Method::Get | Method::Delete | Method::Head, _) => {
            vec![PlannedRequest::new(method, record.clone())]
        }
        _ => vec![PlannedRequest {
            method,
            path: record.clone().into(),
            params: params.clone(),
        }],
    }
}

/// Pick the method from `http_request_method`, falling back to the command.
fn resolve_method(op: &AgentOperationQueryResponse) -> AgentResult<Method> {
    if !op.http_request_method.trim().is_empty() {
        return op.http_request_method.parse().map_err(plan_error);
    }
    match op.command.trim().to_ascii_uppercase().as_str() {
        "CREATE" | "NEW" | "POST" => Ok(Method::Post),
        "FETCH" | "GET" | "READ" => Ok(Method::Get),
        "UPDATE" | "SET" | "PUT" => Ok(Method::Put),
        "DELETE" | "ERASE" | "REMOVE" => Ok(Method::Delete),
        "CHECK" | "EXISTS" | "HEAD" => Ok(Method::Head),
        "" => Err(AgentError::Plan(
            "payload has neither a command nor an HTTP method".to_string(),
        )),
        other => Err(AgentError::Plan(format!("unknown command {:?}", other))),
    }
}

fn parse_level(raw: &str) -> AgentResult<Level> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "COLLECTION" | "COLLECTIONS" => Ok(Level::Collection),
        "CLUSTER" | "CLUSTERS" => Ok(Level::Cluster),
        "RECORD" | "RECORDS" => Ok(Level::Record),
        _ => Err(AgentError::Plan(format!("unknown batch data structure {:?}", raw))),
    }
}

/// Place children under parents.
///
/// With a positive `per_parent` whose chunks cover `names` exactly, the first
/// `per_parent` names go under the first parent and so on. Otherwise every
/// name goes under every parent. Each child is returned with the index of its
/// name in `names`.
fn assign<P, C>(
    parents: &[P],
    names: &[String],
    per_parent: usize,
    make: impl Fn(&P, &String) -> OstrichResult<C>,
) -> AgentResult<Vec<(usize, C)>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    if parents.is_empty() {
        return Err(AgentError::Plan(format!(
            "{:?} named without an enclosing collection or cluster",
            names
        )));
    }

    let chunked = per_parent > 0 && per_parent.checked_mul(parents.len()) == Some(names.len());
    let mut children = Vec::new();
    for (parent_index, parent) in parents.iter().enumerate() {
        for (name_index, name) in names.iter().enumerate() {
            if chunked && name_index / per_parent != parent_index {
                continue;
            }
            children.push((name_index, make(parent, name).map_err(plan_error)?));
        }
    }
    Ok(children)
}

/// Record parameters per record name, following the arity rules: one entry
/// applies to every record, otherwise one entry per record name.
fn record_params(op: &AgentOperationQueryResponse, method: Method) -> AgentResult<Vec<RecordParams>> {
    let count = op.record_names.len();

    let types = spread("record_types", &op.record_types, count)?
        .into_iter()
        .map(|raw| raw.map(|t| t.parse::<RecordType>().map_err(plan_error)).transpose())
        .collect::<AgentResult<Vec<_>>>()?;
    let values = spread("record_values", &op.record_values, count)?
        .into_iter()
        .map(|v| v.map(RecordValue::from_json))
        .collect::<Vec<_>>();

    if matches!(method, Method::Post | Method::Put) && types.iter().any(Option::is_none) {
        return Err(AgentError::Plan(format!("{} on records needs record_types", method)));
    }
    if method == Method::Put && values.iter().any(Option::is_none) {
        return Err(AgentError::Plan("PUT on records needs record_values".to_string()));
    }

    Ok(types
        .into_iter()
        .zip(values)
        .map(|(record_type, value)| RecordParams { record_type, value })
        .collect())
}

fn spread<'a, T>(field: &str, items: &'a [T], count: usize) -> AgentResult<Vec<Option<&'a T>>> {
    match items.len() {
        0 => Ok(vec![None; count]),
        1 => Ok(vec![Some(&items[0]); count]),
        n if n == count => Ok(items.iter().map(Some).collect()),
        n => Err(AgentError::Plan(format!(
            "{} has {} entries for {} records",
            field, n, count
        ))),
    }
}

fn check_count(kind: &str, claimed: usize, planned: usize) {
    if claimed > 0 && claimed != planned {
        warn!(
            "payload claims {} {}(s) but {} were planned",
            claimed, kind, planned
        );
    }
}

fn describe(op: &AgentOperationQueryResponse) -> String {
    if op.command.is_empty() {
        "operation".to_string()
    } else {
        format!("{} operation", op.command)
    }
}

fn plan_error(err: impl Display) -> AgentError {
    AgentError::Plan(err.to_string())
}

/// Send each request in order. Failures are recorded and do not stop the
/// remaining requests.
pub async fn execute_plan(client: &OstrichDBHttpClient, plan: &[PlannedRequest]) -> Vec<PlanOutcome> {
    let mut outcomes = Vec::with_capacity(plan.len());
    for request in plan {
        let outcome = match client
            .execute(request.method, &request.path, &request.params)
            .await
        {
            Ok(res) => PlanOutcome {
                request: request.clone(),
                status: Some(res.status.as_u16()),
                body: Some(res.body),
                error: None,
            },
            Err(err) => {
                warn!("{} failed: {}", request, err);
                PlanOutcome {
                    request: request.clone(),
                    status: err.status().map(|s| s.as_u16()),
                    body: None,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentReply;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rendered(plan: &[PlannedRequest]) -> Vec<String> {
        plan.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn batch_post_creates_parents_first() {
        let op = AgentOperationQueryResponse {
            command: "CREATE".into(),
            http_request_method: "POST".into(),
            is_batch_request: true,
            batch_data_structures: names(&["record", "COLLECTION", "CLUSTER"]),
            collection_names: names(&["shop"]),
            cluster_names: names(&["items"]),
            record_names: names(&["price", "name"]),
            record_types: names(&["FLOAT", "string"]),
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(
            rendered(&plan),
            vec![
                "POST /c/shop",
                "POST /c/shop/cl/items",
                "POST /c/shop/cl/items/r/price type=FLOAT",
                "POST /c/shop/cl/items/r/name type=STRING",
            ]
        );
    }

    #[test]
    fn batch_delete_removes_children_first() {
        let op = AgentOperationQueryResponse {
            command: "ERASE".into(),
            is_batch_request: true,
            batch_data_structures: names(&["COLLECTION", "CLUSTER"]),
            collection_names: names(&["a", "b"]),
            cluster_names: names(&["x", "y"]),
            clusters_per_collection: 1,
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(
            rendered(&plan),
            vec![
                "DELETE /c/a/cl/x",
                "DELETE /c/b/cl/y",
                "DELETE /c/a",
                "DELETE /c/b",
            ]
        );
    }

    #[test]
    fn uneven_chunks_fall_back_to_every_parent() {
        let op = AgentOperationQueryResponse {
            http_request_method: "get".into(),
            collection_names: names(&["a", "b"]),
            cluster_names: names(&["x", "y", "z"]),
            clusters_per_collection: 2,
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(plan.len(), 6);
        assert_eq!(plan[0].to_string(), "GET /c/a/cl/x");
        assert_eq!(plan[3].to_string(), "GET /c/b/cl/x");
    }

    #[test]
    fn non_batch_only_touches_target_level() {
        let op = AgentOperationQueryResponse {
            command: "UPDATE".into(),
            collection_names: names(&["c"]),
            cluster_names: names(&["cl"]),
            record_names: names(&["tags"]),
            record_types: names(&["STRING[]"]),
            record_values: vec![json!(["red", "blue"])],
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(
            rendered(&plan),
            vec!["PUT /c/c/cl/cl/r/tags type=STRING[] value=[red,blue]"]
        );
    }

    #[test]
    fn type_arity_must_match() {
        let op = AgentOperationQueryResponse {
            http_request_method: "POST".into(),
            collection_names: names(&["c"]),
            cluster_names: names(&["cl"]),
            record_names: names(&["a", "b", "c"]),
            record_types: names(&["INT", "STRING"]),
            ..Default::default()
        };
        let err = plan_operations(&[op]).unwrap_err();
        assert!(matches!(err, AgentError::Plan(_)));
    }

    #[test]
    fn post_records_need_types() {
        let op = AgentOperationQueryResponse {
            http_request_method: "POST".into(),
            collection_names: names(&["c"]),
            cluster_names: names(&["cl"]),
            record_names: names(&["a"]),
            ..Default::default()
        };
        assert!(plan_operations(&[op]).is_err());
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let first = AgentOperationQueryResponse {
            command: "CREATE".into(),
            collection_names: names(&["a", "b"]),
            ..Default::default()
        };
        let second = AgentOperationQueryResponse {
            command: "CREATE".into(),
            collection_names: names(&["b", "c"]),
            ..Default::default()
        };

        let plan = plan_operations(&[first, second]).unwrap();
        assert_eq!(rendered(&plan), vec!["POST /c/a", "POST /c/b", "POST /c/c"]);
    }

    #[test]
    fn rejects_unusable_payloads() {
        let no_names = AgentOperationQueryResponse {
            command: "CREATE".into(),
            ..Default::default()
        };
        assert!(plan_operations(&[no_names]).is_err());

        let orphan = AgentOperationQueryResponse {
            command: "CREATE".into(),
            cluster_names: names(&["x"]),
            ..Default::default()
        };
        assert!(plan_operations(&[orphan]).is_err());

        let bad_name = AgentOperationQueryResponse {
            command: "CREATE".into(),
            collection_names: names(&["two words"]),
            ..Default::default()
        };
        assert!(plan_operations(&[bad_name]).is_err());

        let bad_method = AgentOperationQueryResponse {
            http_request_method: "PATCH".into(),
            collection_names: names(&["a"]),
            ..Default::default()
        };
        assert!(plan_operations(&[bad_method]).is_err());
    }

    #[test]
    fn oversized_per_parent_counts_do_not_overflow() {
        let raw = r#"[{"command":"CREATE","collection_names":["a","b"],"cluster_names":["x"],
                      "clusters_per_collection":9223372036854775808}]"#;
        let AgentReply::Operations(ops) = AgentReply::parse(raw).unwrap() else {
            panic!("expected operations");
        };

        let plan = plan_operations(&ops).unwrap();
        assert_eq!(rendered(&plan), vec!["POST /c/a/cl/x", "POST /c/b/cl/x"]);
    }

    #[test]
    fn valued_create_is_followed_by_a_put() {
        let op = AgentOperationQueryResponse {
            command: "CREATE".into(),
            http_request_method: "POST".into(),
            collection_names: names(&["users"]),
            cluster_names: names(&["admins"]),
            record_names: names(&["first_name", "nickname"]),
            record_types: names(&["STRING"]),
            record_values: vec![json!("Marshall"), json!("Marsh")],
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(
            rendered(&plan),
            vec![
                "POST /c/users/cl/admins/r/first_name type=STRING",
                "PUT /c/users/cl/admins/r/first_name type=STRING value=Marshall",
                "POST /c/users/cl/admins/r/nickname type=STRING",
                "PUT /c/users/cl/admins/r/nickname type=STRING value=Marsh",
            ]
        );

        let client = OstrichDBHttpClient::local_node().unwrap();
        let urls: Vec<_> = plan
            .iter()
            .take(2)
            .map(|r| client.url_for(r.method, &r.path, &r.params).unwrap())
            .collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8042/c/users/cl/admins/r/first_name?type=STRING",
                "http://localhost:8042/c/users/cl/admins/r/first_name?type=STRING&value=Marshall",
            ]
        );
    }

    #[test]
    fn reads_and_deletes_drop_record_params() {
        let op = AgentOperationQueryResponse {
            command: "FETCH".into(),
            collection_names: names(&["users"]),
            cluster_names: names(&["admins"]),
            record_names: names(&["age"]),
            record_types: names(&["INTEGER"]),
            record_values: vec![json!(42)],
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(rendered(&plan), vec!["GET /c/users/cl/admins/r/age"]);
        assert_eq!(plan[0].params, RecordParams::none());
    }

    #[test]
    fn updates_with_different_values_are_kept() {
        let update = |value: i64| AgentOperationQueryResponse {
            http_request_method: "PUT".into(),
            collection_names: names(&["c"]),
            cluster_names: names(&["cl"]),
            record_names: names(&["n"]),
            record_types: names(&["INTEGER"]),
            record_values: vec![json!(value)],
            ..Default::default()
        };

        let plan = plan_operations(&[update(1), update(2), update(2)]).unwrap();
        assert_eq!(
            rendered(&plan),
            vec![
                "PUT /c/c/cl/cl/r/n type=INTEGER value=1",
                "PUT /c/c/cl/cl/r/n type=INTEGER value=2",
            ]
        );
    }

    #[test]
    fn batch_put_only_updates_records() {
        let op = AgentOperationQueryResponse {
            command: "UPDATE".into(),
            is_batch_request: true,
            batch_data_structures: names(&["COLLECTION", "CLUSTER", "RECORD"]),
            collection_names: names(&["x"]),
            cluster_names: names(&["y"]),
            record_names: names(&["z"]),
            record_types: names(&["BOOLEAN"]),
            record_values: vec![json!(true)],
            ..Default::default()
        };

        let plan = plan_operations(&[op]).unwrap();
        assert_eq!(rendered(&plan), vec!["PUT /c/x/cl/y/r/z type=BOOLEAN value=true"]);
    }

    #[test]
    fn count_mismatch_is_not_fatal() {
        let op = AgentOperationQueryResponse {
            command: "FETCH".into(),
            collection_names: names(&["a"]),
            total_collection_count: 3,
            ..Default::default()
        };
        assert_eq!(plan_operations(&[op]).unwrap().len(), 1);
    }
}
