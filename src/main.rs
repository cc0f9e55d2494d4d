//! S3 Console
//!
//! Command-line front end for managing buckets and objects in an
//! S3-compatible store. Connection settings come from the environment.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use s3_console::s3::types::file_name_of;
use s3_console::s3::{stream_object, ClientConfig, Failure, Severity, StorageClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "s3-console", version, about)]
struct Cli {
    /// Print listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all buckets
    Buckets,
    /// Create a bucket
    CreateBucket { name: String },
    /// Delete an empty bucket
    DeleteBucket { name: String },
    /// List the objects in a bucket
    Objects { bucket: String },
    /// Download an object
    Download {
        bucket: String,
        key: String,
        /// Destination file; defaults to the last component of the key
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::debug!("Starting S3 Console v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    let client = StorageClient::new(&config).await?;

    match run(&client, cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(failure) => {
            notify(failure.severity, &format!("Error: {}", failure.message));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(client: &StorageClient, cli: Cli) -> Result<(), Failure> {
    match cli.command {
        Command::Buckets => {
            let buckets = client.list_buckets().await?;
            if cli.json {
                print_json(&buckets)?;
            } else {
                for bucket in &buckets {
                    let created = bucket
                        .creation_date
                        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<20} {}", created, bucket.name);
                }
            }
        }
        Command::CreateBucket { name } => {
            client.create_bucket(&name).await?;
            notify(
                Severity::Success,
                &format!("Bucket '{}' created successfully!", name),
            );
        }
        Command::DeleteBucket { name } => {
            client.delete_bucket(&name).await?;
            notify(
                Severity::Success,
                &format!("Bucket '{}' deleted successfully!", name),
            );
        }
        Command::Objects { bucket } => {
            let objects = client.list_objects(&bucket).await?;
            if cli.json {
                print_json(&objects)?;
            } else if objects.is_empty() {
                println!("Bucket '{}' is empty", bucket);
            } else {
                for obj in &objects {
                    let modified = obj
                        .last_modified
                        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<20} {:>12} {}", modified, obj.size_string(), obj.key);
                }
            }
        }
        Command::Download {
            bucket,
            key,
            output,
        } => {
            let download = stream_object(client, &bucket, &key).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(file_name_of(&download.filename)));
            let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
                Failure::generic(format!("Failed to create {}: {}", path.display(), e))
            })?;
            let content_type = download
                .content_type
                .clone()
                .unwrap_or_else(|| "unknown type".to_string());
            let written = download.write_to(&mut file).await?;
            notify(
                Severity::Success,
                &format!(
                    "Downloaded {} bytes ({}) to {}",
                    written,
                    content_type,
                    path.display()
                ),
            );
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Failure> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Failure::generic(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn notify(severity: Severity, message: &str) {
    match severity {
        Severity::Success => println!("{}", message),
        Severity::Danger => eprintln!("{}", message),
    }
}
