use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber; stdout is left to command output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chat_insights=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    chat_insights::cli::commands::run()
}
