use tours_api::config::ApiConfig;
use tours_api::seed;
use tours_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tours_api=info,tower_http=info".into()),
        )
        .init();

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("configuration error: {e}");
        std::process::exit(1);
    });

    let collections = seed::load(config.data_dir.as_deref()).unwrap_or_else(|e| {
        eprintln!("failed to load seed data: {e}");
        std::process::exit(1);
    });
    tracing::info!(
        tours = collections.tours.len(),
        reviews = collections.reviews.len(),
        users = collections.users.len(),
        "collections ready"
    );

    let environment = config.environment;
    let app = tours_api::app(AppState::new(collections, &config));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("failed to bind {}: {e}", config.addr);
            std::process::exit(1);
        });

    tracing::info!(addr = %config.addr, ?environment, "tours-api listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
