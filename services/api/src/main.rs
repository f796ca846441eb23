use sea_orm::Database;
use tracing::info;

use morea_api::config::ApiConfig;
use morea_api::router::build_router;
use morea_api::state::AppState;
use morea_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        http: reqwest::Client::new(),
        jwt_secret: config.jwt_secret,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("morea api listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
