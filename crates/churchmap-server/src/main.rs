use churchmap_server::{router, AppState, Config};
use churchmap_storage::SharedStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env();
    info!(
        data_dir = %cfg.data_dir.display(),
        chunks = cfg.chunk_count,
        "starting churchmap server"
    );

    let state = AppState::new(SharedStore::new());

    // Chunks load in the background; sessions opened meanwhile see the
    // progress status and are re-rendered once the store is ready.
    let loader_state = state.clone();
    let source = cfg.source();
    tokio::spawn(async move {
        loader_state.load_from(&source).await;
        info!(status = %loader_state.status_message(), "data load finished");
    });

    let app = router(state);
    info!("http listening on {}", cfg.bind_addr);
    axum_server::bind(cfg.bind_addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
