//! Creates a collection, cluster and record on a local OstrichDB server,
//! reads the record back and removes everything again.
//!
//! ```bash
//! cargo run -p ostrichdb-client --example walkthrough
//! ```

use ostrichdb_client::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = OstrichDBHttpClient::from_env()?;
    println!("OstrichDB {} at {}", client.version().await?, client.endpoint);

    let record = RecordPath::new("rust_collection", "rust_cluster", "rust_record")?;
    let cluster = record.parent();
    let collection = cluster.parent();

    client.create_collection(collection).await?;
    client.create_cluster(cluster).await?;
    client.create_record(&record, RecordType::String).await?;
    client
        .set_record(&record, RecordType::String, "Hello-World!")
        .await?;

    println!("{} = {}", record.record(), client.get_record(&record).await?);
    println!("exists: {}", client.record_exists(&record).await?);

    client.delete_record(&record).await?;
    client.delete_cluster(cluster).await?;
    client.delete_collection(collection).await?;

    for entry in client.operation_log().get_all() {
        println!(
            "{} {} -> {:?} ({}ms)",
            entry.method, entry.path, entry.status, entry.duration_ms
        );
    }
    Ok(())
}
