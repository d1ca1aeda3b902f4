mod commands;
mod config;
mod formatter;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{actions, agent, clean, profile, Output};
use formatter::{ColorMode, OutputFormat};
use ostrichdb_client::{Method, RecordType};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ost")]
#[command(about = "OstrichDB CLI - collections, clusters, records and the OstrichDB assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// OstrichDB server URL (overrides profiles)
    #[arg(long, global = true, env = "OSTRICHDB_HOST")]
    host: Option<String>,

    /// Profile to take the host from (uses the active profile if not specified)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Color output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the server version
    Version,

    /// Perform a request on a collection
    Collection {
        /// GET, POST, PUT, HEAD or DELETE
        method: Method,
        collection: String,
    },

    /// Perform a request on a cluster
    Cluster {
        /// GET, POST, PUT, HEAD or DELETE
        method: Method,
        collection: String,
        cluster: String,
    },

    /// Perform a request on a record
    Record {
        /// GET, POST, PUT, HEAD or DELETE
        method: Method,
        collection: String,
        cluster: String,
        record: String,

        /// Record type, required for POST and PUT (e.g. STRING, INTEGER[])
        #[arg(long = "type", short = 't')]
        record_type: Option<RecordType>,

        /// Record value, required for PUT
        #[arg(long, short = 'v')]
        value: Option<String>,
    },

    /// Chat with the assistant; type 'exit' to quit
    Agent {
        #[command(flatten)]
        args: agent::AgentArgs,
    },

    /// Send a single prompt to the assistant
    Ask {
        prompt: String,

        #[command(flatten)]
        args: agent::AgentArgs,
    },

    /// Manage named server profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Delete native build artifacts from a directory
    Clean {
        /// Directory to clean
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// File extensions to delete
        #[arg(short, long, num_args = 1.., default_values_t = clean::DEFAULT_EXTENSIONS.map(String::from))]
        extensions: Vec<String>,

        /// Show what would be deleted without deleting
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Process subdirectories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// List all profiles
    List,
    /// Show a profile
    Show {
        /// Profile name (default: active profile)
        name: Option<String>,
    },
    /// Create or update a profile
    Set {
        name: String,
        /// OstrichDB server URL
        url: String,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Make a profile the active one
    Use { name: String },
    /// Delete a profile
    Delete {
        name: String,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr, keeping stdout clean for data
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let output = Output {
        format: cli.format,
        colorize: cli.color.should_colorize(),
    };

    // Subcommands that never talk to the server
    match &cli.command {
        Commands::Profile { command } => {
            return match command {
                ProfileCommands::List => profile::run_profile_list(),
                ProfileCommands::Show { name } => profile::run_profile_show(name.as_deref()),
                ProfileCommands::Set { name, url, timeout } => {
                    profile::run_profile_set(name, url, *timeout)
                }
                ProfileCommands::Use { name } => profile::run_profile_use(name),
                ProfileCommands::Delete { name, yes } => profile::run_profile_delete(name, *yes),
            }
        }
        Commands::Clean {
            dir,
            extensions,
            dry_run,
            recursive,
            yes,
        } => return clean::run_clean(dir, extensions, *dry_run, *recursive, *yes),
        _ => {}
    }

    let connection = config::resolve_connection(cli.host.as_deref(), cli.profile.as_deref())?;
    debug!(
        "Using {} (profile: {})",
        connection.host,
        connection.profile.as_deref().unwrap_or("none")
    );
    let client = connection.client()?;

    match cli.command {
        Commands::Version => actions::run_version(&client).await,
        Commands::Collection { method, collection } => {
            actions::run_collection(&client, method, &collection, &output).await
        }
        Commands::Cluster {
            method,
            collection,
            cluster,
        } => actions::run_cluster(&client, method, &collection, &cluster, &output).await,
        Commands::Record {
            method,
            collection,
            cluster,
            record,
            record_type,
            value,
        } => {
            actions::run_record(
                &client,
                method,
                &collection,
                &cluster,
                &record,
                record_type,
                value,
                &output,
            )
            .await
        }
        Commands::Agent { args } => agent::run_agent(&client, &args, &output).await,
        Commands::Ask { prompt, args } => agent::run_ask(&client, &prompt, &args, &output).await,
        Commands::Profile { .. } | Commands::Clean { .. } => Ok(()),
    }
}
