use infocache::bus::BusBundle;
use infocache::cache::CacheAccessor;
use infocache::fetch::{ExchangeFetcher, Fetcher, WeatherFetcher};
use infocache::models::{ExchangeRate, Weather};
use infocache::popular::PopularityPublisher;
use infocache::requestlog::{connect_postgres, PgRequestLog, RequestLog};
use infocache::store::{KeyValueStore, RedisStore};
use infocache::users::{UserRepository, UserService};
use infocache::workers;
use server_http::{build_router, AppState};
use shared::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting infocache HTTP server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    // External collaborators: store, request log, bus
    let redis = RedisStore::connect(&config.redis_url).expect("Failed to open Redis client");
    redis.ping().await.expect("Redis is unreachable");
    let store: Arc<dyn KeyValueStore> = Arc::new(redis);

    let pool = connect_postgres(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");
    let request_log: Arc<dyn RequestLog> = Arc::new(PgRequestLog::new(pool.clone()));

    let bus = BusBundle::connect(&config).expect("Failed to connect to the message bus");
    let producers = bus.producers;

    // Upstream fetchers, shared between the accessors and the workers
    let weather_fetcher: Arc<dyn Fetcher<Value = Weather>> = Arc::new(
        WeatherFetcher::new(&config.weather_api_key).expect("Failed to build weather client"),
    );
    let exchange_fetcher: Arc<dyn Fetcher<Value = ExchangeRate>> = Arc::new(
        ExchangeFetcher::new(&config.currency_api_key).expect("Failed to build exchange client"),
    );

    // Background pipeline: consumers, workers, popularity ticker
    let cancel = CancellationToken::new();
    let pipeline = workers::start_workers(
        store.clone(),
        weather_fetcher.clone(),
        exchange_fetcher.clone(),
        bus.consumers,
        &cancel,
    );
    let popular = PopularityPublisher::new(
        request_log.clone(),
        producers.popular.clone(),
        Duration::from_secs(config.popular_interval_secs),
    )
    .start(cancel.clone());

    let state = AppState {
        weather: Arc::new(CacheAccessor::new(
            store.clone(),
            producers.weather.clone(),
            weather_fetcher,
        )),
        exchange: Arc::new(CacheAccessor::new(
            store.clone(),
            producers.exchange.clone(),
            exchange_fetcher,
        )),
        users: Arc::new(UserService::new(
            Arc::new(UserRepository::new(pool)),
            producers.user.clone(),
        )),
        request_log,
        store,
    };

    let router = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Stop the background loops, then flush whatever they produced
    cancel.cancel();
    let _ = popular.await;
    pipeline.join().await;
    producers.close();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
