//! Sketchbluff game server.
//!
//! Players connect over WebSocket, gather in sessions by code, and play rounds of
//! drawing, voting and guessing.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin sketchbluff-server -- --port 8080
//! ```

use clap::Parser;
use sketchbluff_server::ServerConfig;
use sketchbluff_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = sketchbluff_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
