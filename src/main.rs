//! Forex Signal Extractor — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forex_signal_extractor::api::{create_router, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("forex_signal_extractor=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent. Supplies GEMINI_API_KEY,
    // GEMINI_MODEL, and PORT.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = AppState::from_env();
    let router = create_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8001);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "forex-signal-extractor listening");
    axum::serve(listener, router).await?;

    Ok(())
}
