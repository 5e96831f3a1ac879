use anyhow::Context;
use slideshow_backend::{config::Config, create_app, database, storage, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slideshow_backend=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let repository = database::connect(&config)
        .await
        .context("connecting to the database")?;
    let storage = storage::create_storage(&config.storage).context("configuring storage")?;
    tracing::info!(
        "Storage backend {:?}, bucket {}",
        config.storage.backend,
        config.storage.bucket
    );

    let port = config.port;
    let state = AppState::new(config, repository, storage)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
