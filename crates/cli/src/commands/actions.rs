//! Direct collection, cluster and record requests

use super::Output;
use crate::formatter::{format_failure, format_response};
use anyhow::{Context, Result};
use ostrichdb_client::{
    ClusterPath, CollectionPath, Method, OstrichDBHttpClient, OstrichError, OstrichResponse,
    OstrichResult, RecordParams, RecordPath, RecordType, RecordValue,
};
use tracing::{debug, info};

pub async fn run_version(client: &OstrichDBHttpClient) -> Result<()> {
    info!("Checking OstrichDB at {}", client.endpoint);
    let version = client
        .version()
        .await
        .with_context(|| format!("OstrichDB is not reachable at {}", client.endpoint))?;
    println!("{}", version);
    Ok(())
}

pub async fn run_collection(
    client: &OstrichDBHttpClient,
    method: Method,
    collection: &str,
    output: &Output,
) -> Result<()> {
    let path = CollectionPath::new(collection)?;
    report(client.collection_action(method, &path).await, output)
}

pub async fn run_cluster(
    client: &OstrichDBHttpClient,
    method: Method,
    collection: &str,
    cluster: &str,
    output: &Output,
) -> Result<()> {
    let path = ClusterPath::new(collection, cluster)?;
    report(client.cluster_action(method, &path).await, output)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_record(
    client: &OstrichDBHttpClient,
    method: Method,
    collection: &str,
    cluster: &str,
    record: &str,
    record_type: Option<RecordType>,
    value: Option<String>,
    output: &Output,
) -> Result<()> {
    let path = RecordPath::new(collection, cluster, record)?;
    let params = RecordParams {
        record_type,
        value: value.map(RecordValue::from),
    };
    debug!("{} {:?} with {:?}", method, path, params);
    report(client.record_action(method, &path, &params).await, output)
}

/// Print a response, or print the server's answer and fail for non-2xx.
fn report(result: OstrichResult<OstrichResponse>, output: &Output) -> Result<()> {
    match result {
        Ok(res) => {
            println!("{}", format_response(&res, output.format, output.colorize));
            Ok(())
        }
        Err(OstrichError::Status {
            method,
            url,
            status,
            body,
        }) => {
            println!(
                "{}",
                format_failure(method, &url, status.as_u16(), &body, output.format, output.colorize)
            );
            anyhow::bail!("{} {} failed with status {}", method, url, status)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::OutputFormat;
    use reqwest::StatusCode;

    const OUTPUT: Output = Output {
        format: OutputFormat::Compact,
        colorize: false,
    };

    #[test]
    fn non_success_status_fails_the_command() {
        let result = Err(OstrichError::Status {
            method: Method::Get,
            url: "http://localhost:8042/c/missing".to_string(),
            status: StatusCode::NOT_FOUND,
            body: "collection not found".to_string(),
        });

        let err = report(result, &OUTPUT).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GET http://localhost:8042/c/missing failed with status 404 Not Found"
        );
    }

    #[test]
    fn other_errors_pass_through() {
        let err = report(Err(OstrichError::validation("bad name")), &OUTPUT).unwrap_err();
        assert!(err.downcast_ref::<OstrichError>().is_some());
    }
}
