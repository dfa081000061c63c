//! OpenDesk Server - HTTP REST API for the OpenDesk helpdesk
//!
//! This crate provides the HTTP surface over the `opendesk` core crate:
//!
//! - **Custom Fields**: Create and list user-defined fields with typed
//!   option validation
//! - **User Invitation**: Staff-driven account creation with invitation mail
//! - **Health & Metrics**: Liveness/readiness probes and Prometheus metrics
//!
//! # Features
//!
//! - **Authentication**: Staff API keys with privilege levels and rate
//!   limiting
//! - **Middleware**: Compression, CORS, request ID tracking, structured
//!   logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: Stable error codes in a uniform response envelope
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `GET /api/v1/system/custom-fields` - List custom fields
//! - `POST /api/v1/user/invite` - Invite a user
//!
//! ## Staff Endpoints (API Key Required)
//!
//! - `POST /api/v1/system/add-custom-field` - Create a custom field
//! - `GET /api/v1/metadata` - Server metadata

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{router, start_server};
pub use state::ServerState;
