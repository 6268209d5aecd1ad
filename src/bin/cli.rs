//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! CLI over the s3util library.
//!
//! Examples:
//! ```bash
//! s3util-cli list      s3://bucket/prefix/ --suffix .json
//! s3util-cli exists    s3://bucket/key
//! s3util-cli get       s3://bucket/key
//! s3util-cli upload    local-file s3://bucket/key
//! s3util-cli download  s3://bucket/key ./out/
//! s3util-cli presign   s3://bucket/key --method GET
//! s3util-cli inventory s3://bucket/inventory/ --start-date 2023-03-01
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use futures_util::StreamExt;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use s3util::{
    AwsClient, InventoryQuery, PresignOptions, PutOptions, download, exists, find_objects,
    latest_inventory, parse_s3_uri, presign_url, read, upload,
};

#[derive(Parser)]
#[command(name = "s3util-cli", about = "S3 object helper CLI", version)]
struct Cli {
    /// Increase log verbosity (-v = info, -vv = debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List keys under a bucket/prefix URI
    List {
        /// Prefix URI, e.g. s3://bucket/prefix/
        uri: String,
        /// Only print keys ending with this suffix
        #[arg(short, long, default_value = "")]
        suffix: String,
    },
    /// Check whether an object exists
    Exists { uri: String },
    /// Print an object to stdout (gunzips .gz keys)
    Get { uri: String },
    /// Upload a local file to an object URI
    Upload {
        file: PathBuf,
        uri: String,
        /// Store with a public-read ACL
        #[arg(long)]
        public: bool,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Download an object into a directory, keeping its filename
    Download {
        uri: String,
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Compute a signed request for an object without contacting AWS
    Presign {
        uri: String,
        #[arg(long)]
        region: Option<String>,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        requester_pays: bool,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Scan the latest inventory report under a URI
    Inventory {
        uri: String,
        /// Only keep records whose Key starts with this prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Only keep records whose Key ends with this suffix
        #[arg(long)]
        suffix: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Schema column driving the date window
        #[arg(long, default_value = "LastModifiedDate")]
        datetime_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.cmd {
        Command::List { uri, suffix } => {
            let client = AwsClient::from_env().await?;
            let parts = parse_s3_uri(&uri)?;
            let mut keys = find_objects(&client, &parts, &suffix);
            while let Some(key) = keys.next().await {
                println!("{}", key?);
            }
        }
        Command::Exists { uri } => {
            let client = AwsClient::from_env().await?;
            let found = exists(&client, &uri).await?;
            println!("{found}");
            if !found {
                std::process::exit(1);
            }
        }
        Command::Get { uri } => {
            let client = AwsClient::from_env().await?;
            print!("{}", read(&client, &uri).await?);
        }
        Command::Upload {
            file,
            uri,
            public,
            content_type,
        } => {
            let client = AwsClient::from_env().await?;
            let opts = PutOptions {
                public,
                content_type,
            };
            let stored = upload(&client, &file, &uri, &opts).await?;
            println!("{stored}");
        }
        Command::Download { uri, dir } => {
            let client = AwsClient::from_env().await?;
            let path = download(&client, &uri, &dir).await?;
            println!("{}", path.display());
        }
        Command::Presign {
            uri,
            region,
            method,
            public,
            requester_pays,
            content_type,
        } => {
            let opts = PresignOptions {
                region,
                method,
                public,
                requester_pays,
                content_type,
            };
            let signed = presign_url(&uri, &opts)?;
            println!("{}", signed.url);
            match signed.headers {
                Some(headers) => {
                    for (name, value) in headers {
                        println!("{name}: {value}");
                    }
                }
                None => println!("(unsigned: no credentials resolved)"),
            }
        }
        Command::Inventory {
            uri,
            prefix,
            suffix,
            start_date,
            end_date,
            datetime_key,
        } => {
            let client = AwsClient::from_env().await?;
            let parts = parse_s3_uri(&uri)?;
            let query = InventoryQuery {
                prefix,
                suffix,
                start_date,
                end_date,
                datetime_key,
            };
            let mut records = latest_inventory(&client, &parts, query);
            while let Some(record) = records.next().await {
                println!("{}", serde_json::to_string(&record?)?);
            }
        }
    }
    Ok(())
}
