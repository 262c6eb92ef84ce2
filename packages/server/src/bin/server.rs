//! Cohort chat and presence server.
//!
//! Run with:
//! ```not_rust
//! COHORT_CHAT_TOKEN_SECRET=dev-secret cargo run --bin cohort-chat-server
//! cargo run --bin cohort-chat-server -- --host 0.0.0.0 --port 3000 \
//!     --token-secret dev-secret --identities identities.json
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use cohort_chat_server::{
    domain::IdentityDirectory,
    infrastructure::{
        auth::{HmacTokenCodec, TokenIdentityResolver},
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryIdentityDirectory, InMemoryMessageRepository},
    },
    ui::{AppState, Server},
};
use cohort_chat_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "cohort-chat-server")]
#[command(about = "Real-time cohort chat and presence server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "COHORT_CHAT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "COHORT_CHAT_PORT", default_value = "8080")]
    port: u16,

    /// Shared secret used to verify connection tokens
    #[arg(long, env = "COHORT_CHAT_TOKEN_SECRET", hide_env_values = true)]
    token_secret: String,

    /// JSON file with the identities known to the server
    #[arg(long, env = "COHORT_CHAT_IDENTITIES")]
    identities: Option<PathBuf>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_BIN_NAME"), "tower_http"], &args.log_level);

    // Initialize dependencies in order:
    // 1. Identity directory
    // 2. Token verification
    // 3. Repository and MessagePusher
    // 4. AppState
    // 5. Server

    // 1. Identity directory (seeded from file when given)
    let directory = match &args.identities {
        Some(path) => match InMemoryIdentityDirectory::from_json_file(path).await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!("Failed to load identities from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No identity file given; every connection will be rejected");
            InMemoryIdentityDirectory::new(Vec::new())
        }
    };
    tracing::info!("Loaded {} identities", directory.len().await);
    let directory: Arc<dyn IdentityDirectory> = Arc::new(directory);

    // 2. Token verification
    let codec = match HmacTokenCodec::new(args.token_secret.as_bytes()) {
        Ok(codec) => codec,
        Err(e) => {
            tracing::error!("Invalid token secret: {}", e);
            std::process::exit(1);
        }
    };
    let clock = Arc::new(SystemClock);
    let resolver = Arc::new(TokenIdentityResolver::new(
        codec,
        directory.clone(),
        clock.clone(),
    ));

    // 3. Repository (in-memory database) and MessagePusher (WebSocket implementation)
    let repository = Arc::new(InMemoryMessageRepository::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 4. AppState
    let state = Arc::new(AppState::new(
        repository,
        directory,
        resolver,
        message_pusher,
        clock,
    ));

    // 5. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
