//! Application entrypoint.

use star_ledger::{config::Config, router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .init();

    // Nothing is persisted; every start begins from genesis.
    let state = AppState::new();
    {
        let ledger = state.ledger.read();
        if let Some(genesis) = ledger.tip() {
            tracing::info!(fingerprint = %genesis.fingerprint, "ledger initialized");
        }
    }

    let app = router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Listening on http://{}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
