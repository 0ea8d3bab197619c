//! Pheme - Feedback Collection Service
//!
//! This is the main entry point for the Pheme server, which collects user
//! feedback over a JSON API and serves aggregate statistics to the
//! bundled terminal dashboard.

use clap::{Parser, Subcommand};
use pheme_core::{
    config::{self, ServerConfig},
    error::{PhemeError, Result},
    types::{FeedbackRecord, FeedbackStats},
    ApiServer, SqliteStorage,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "pheme")]
#[command(about = "Feedback collection service with aggregate statistics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Database path (overrides PHEME_DB_PATH env var and default)
    #[arg(long)]
    db_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the feedback API server
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:5000", env = "PHEME_ADDR")]
        addr: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        request_timeout: u64,
    },

    /// Initialize the database
    Init,

    /// Submit one feedback record to a running server
    Submit {
        /// Submitter name
        #[arg(short, long)]
        name: String,

        /// Submitter email
        #[arg(short, long)]
        email: String,

        /// Feedback message
        #[arg(short, long)]
        message: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: i64,

        /// API server URL
        #[arg(long, default_value = "http://localhost:5000")]
        api: String,
    },

    /// Show server health and aggregate statistics
    Status {
        /// API server URL
        #[arg(long, default_value = "http://localhost:5000")]
        api: String,
    },
}

/// Open storage and ensure the schema exists
async fn open_storage(db_path_arg: Option<String>) -> Result<SqliteStorage> {
    let db_path = config::resolve_db_path(db_path_arg);
    debug!("Using database: {}", db_path.display());

    let storage = SqliteStorage::open(&db_path)?;
    storage.init_schema().await?;
    Ok(storage)
}

/// Start the API server
async fn serve(db_path_arg: Option<String>, addr: String, request_timeout: u64) -> Result<()> {
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| PhemeError::InvalidAddress(format!("{}: {}", addr, e)))?;

    let storage = open_storage(db_path_arg).await?;

    let server_config = ServerConfig {
        addr: socket_addr,
        request_timeout: std::time::Duration::from_secs(request_timeout),
    };

    println!();
    println!("Pheme Feedback Service");
    println!();
    println!("   Address: http://{}", socket_addr);
    println!();
    println!("   Endpoints:");
    println!("   • POST /api/feedback - Submit feedback");
    println!("   • GET  /api/feedback - List all feedback, newest first");
    println!("   • GET  /api/stats - Aggregate statistics");
    println!("   • GET  /api/health - Health check");
    println!();
    println!("   Dashboard: pheme-dash --api http://{}", socket_addr);
    println!();

    let server = ApiServer::new(server_config, Arc::new(storage));
    server.serve().await
}

/// Submit one feedback record via the HTTP API
async fn submit(api: String, name: String, email: String, message: String, rating: i64) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/feedback", api))
        .json(&json!({
            "name": name,
            "email": email,
            "message": message,
            "rating": rating,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    if status.is_success() {
        let record: FeedbackRecord = serde_json::from_value(body["feedback"].clone())?;
        println!("✓ Feedback submitted (id: {})", record.id);
        Ok(())
    } else {
        let reason = body["error"].as_str().unwrap_or("unknown error");
        Err(PhemeError::Other(format!(
            "Submission rejected ({}): {}",
            status, reason
        )))
    }
}

/// Print server health and aggregate statistics
async fn status(api: String) -> Result<()> {
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/api/health", api))
        .send()
        .await?
        .json()
        .await?;
    let stats: FeedbackStats = client
        .get(format!("{}/api/stats", api))
        .send()
        .await?
        .json()
        .await?;

    println!("Server: {}", health["status"].as_str().unwrap_or("unknown"));
    println!();
    println!("   Total feedback:  {}", stats.total);
    println!("   Average rating:  {:.2}", stats.avg_rating);
    println!("   Positive (>=4):  {}", stats.positive);
    println!("   Negative (<3):   {}", stats.negative);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!("pheme={}", level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Pheme v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            addr,
            request_timeout,
        } => serve(cli.db_path, addr, request_timeout).await,
        Commands::Init => {
            open_storage(cli.db_path.clone()).await?;
            println!(
                "✓ Database initialized at {}",
                config::resolve_db_path(cli.db_path).display()
            );
            Ok(())
        }
        Commands::Submit {
            name,
            email,
            message,
            rating,
            api,
        } => submit(api, name, email, message, rating).await,
        Commands::Status { api } => status(api).await,
    }
}
