use plane_mcp_server::{Config, PlaneMcpServer};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Append-mode debug log file named by `PLANE_MCP_DEBUG_LOG`, if any
fn debug_log_file() -> Option<std::fs::File> {
    let path = std::env::var("PLANE_MCP_DEBUG_LOG").ok()?;
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not open debug log {}: {}", path, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Debug file gets JSON lines so it can be grepped by field
    let file_layer = debug_log_file().map(|file| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
    });

    // Write logs to stderr to keep stdout clean for the MCP JSON protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plane_mcp_server=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(file_layer)
        .init();

    info!("Starting Plane MCP Server");

    // Env vars first, then config file
    let config = Config::from_env_or_file()?;
    info!(
        host = %config.host_url,
        api_key_configured = config.api_key.is_some(),
        workspace = config.workspace_slug.as_deref().unwrap_or("<unset>"),
        "Configuration loaded"
    );

    let mcp_server = PlaneMcpServer::new(&config)?;
    info!("MCP server initialized");

    let service = mcp_server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
