use tracing::warn;

/// Runtime configuration, read once at startup and passed by reference
/// to constructors. There is no process-global config state.
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub database_url: String,
    pub kafka_brokers: String,
    pub weather_topic: String,
    pub exchange_topic: String,
    pub user_topic: String,
    pub popular_topic: String,
    pub weather_api_key: String,
    pub currency_api_key: String,
    pub popular_interval_secs: u64,
}

impl Config {
    const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
    const DEFAULT_KAFKA_BROKERS: &str = "localhost:9092";
    const POPULAR_TOPIC: &str = "popular-requests";

    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .unwrap_or(8080);
        let weather_api_key = std::env::var("WEATHERAPI_KEY").unwrap_or_else(|_| {
            warn!("WEATHERAPI_KEY not set, weather fetches will fail");
            String::new()
        });
        let currency_api_key = std::env::var("FREECURRENCY_API_KEY").unwrap_or_else(|_| {
            warn!("FREECURRENCY_API_KEY not set, exchange fetches will fail");
            String::new()
        });
        Self {
            port,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| Self::DEFAULT_REDIS_URL.to_string()),
            database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
            kafka_brokers: std::env::var("KAFKA_BROKERS")
                .unwrap_or_else(|_| Self::DEFAULT_KAFKA_BROKERS.to_string()),
            weather_topic: std::env::var("WEATHER_KAFKA_TOPIC")
                .unwrap_or_else(|_| "weather-updates".to_string()),
            exchange_topic: std::env::var("EXCHANGE_KAFKA_TOPIC")
                .unwrap_or_else(|_| "exchange-updates".to_string()),
            user_topic: std::env::var("USER_KAFKA_TOPIC")
                .unwrap_or_else(|_| "user-events".to_string()),
            popular_topic: Self::POPULAR_TOPIC.to_string(),
            weather_api_key,
            currency_api_key,
            popular_interval_secs: std::env::var("POPULAR_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .unwrap_or(300),
        }
    }
}
