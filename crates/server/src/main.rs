//! OpenDesk Server - HTTP REST API for the OpenDesk helpdesk
//!
//! This binary serves the custom field administration and user invitation
//! endpoints with staff authentication and rate limiting.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so the config environment source sees it
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
