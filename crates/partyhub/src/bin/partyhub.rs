//! partyhub server binary.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin partyhub
//! cargo run --bin partyhub -- --host 0.0.0.0 --port 3000 --static-dir public
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use partyhub::logger::setup_logger;
use partyhub::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "partyhub")]
#[command(about = "Room hub and timed party game server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Directory of static assets served at `/`
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let mut builder = PartyHubServerBuilder::new().bind(&format!("{}:{}", args.host, args.port));
    if let Some(dir) = args.static_dir {
        tracing::info!(dir = %dir.display(), "serving static assets");
        builder = builder.static_dir(dir);
    }

    let server = match builder.build(MemoryStore::new()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
