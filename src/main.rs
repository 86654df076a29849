use orbita::commands::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unusable.
fn default_filter() -> EnvFilter {
    if std::env::var("ORBITA_DEBUG").is_ok() {
        EnvFilter::new("orbita=debug")
    } else {
        EnvFilter::new("orbita=info")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(default_filter);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Cli::menu().await
}
