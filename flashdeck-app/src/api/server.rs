use axum::{
    extract::DefaultBodyLimit,
    routing::{get, get_service},
    Router,
};
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::api::routes::{create_card, create_deck, fetch_upload, list_cards, list_decks, AppState};
use crate::config::ServeConfig;

pub fn router(state: AppState, public_dir: &Path, body_limit: usize) -> Router {
    let page = |name: &str| ServeFile::new(public_dir.join(name));

    Router::new()
        .route("/", get_service(page("index.html")))
        .route("/create", get_service(page("create.html")).post(create_deck))
        .route("/deck", get_service(page("deck.html")).post(create_card))
        .route("/endpoint", get(list_decks))
        .route("/deck/endpoint", get(list_cards))
        .route("/uploads/:filename", get(fetch_upload))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(state: AppState, cfg: &ServeConfig) -> anyhow::Result<()> {
    let app = router(state, &cfg.public_dir, cfg.body_limit);

    let listener = TcpListener::bind(cfg.addr).await?;
    tracing::info!(addr = %cfg.addr, public = %cfg.public_dir.display(), "listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
