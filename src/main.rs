use rolegate::{config, router, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up JWT_SECRET, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rolegate=debug,tower_http=debug".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("starting rolegate in {:?} mode", config.environment);

    let state = AppState::in_memory();
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("rolegate listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
