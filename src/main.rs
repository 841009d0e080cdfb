use axum::routing::get;
use axum::Router;
use gateway_callbacks::config::AppConfig;
use gateway_callbacks::gateways::mock::MockGateway;
use gateway_callbacks::gateways::offsite::OffsiteGateway;
use gateway_callbacks::gateways::PaymentGateway;
use gateway_callbacks::repo::dedup_repo::DedupRepo;
use gateway_callbacks::repo::payments_repo::PaymentsRepo;
use gateway_callbacks::service::callback_dispatcher::CallbackDispatcher;
use gateway_callbacks::service::completion::GatewayCompletionService;
use gateway_callbacks::service::idempotency_gate::IdempotencyGate;
use gateway_callbacks::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let dedup_repo = DedupRepo { pool: pool.clone() };
    let payments_repo = PaymentsRepo { pool: pool.clone() };

    let gateway: Arc<dyn PaymentGateway> = if cfg.gateway_adapter == "MOCK" {
        Arc::new(MockGateway {
            gateway_name: "mock".to_string(),
            behavior: std::env::var("MOCK_GATEWAY_BEHAVIOR").unwrap_or_default(),
        })
    } else {
        Arc::new(OffsiteGateway {
            base_url: std::env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.gateway.example".to_string()),
            api_key: std::env::var("GATEWAY_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("GATEWAY_API_SECRET").unwrap_or_default(),
            timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(2500),
            client: reqwest::Client::new(),
        })
    };

    let completion = GatewayCompletionService {
        payments_repo: payments_repo.clone(),
        gateway,
    };

    let callback_dispatcher = CallbackDispatcher {
        gate: IdempotencyGate::new(Arc::new(dedup_repo), cfg.retry_window_seconds),
        payments: Arc::new(payments_repo.clone()),
        completion: Arc::new(completion),
        base_url: cfg.public_base_url.clone(),
    };

    let state = AppState {
        callback_dispatcher,
        payments_repo,
    };

    let app = Router::new()
        .route(
            "/paymentendpoint/:identifier/:status",
            get(gateway_callbacks::http::handlers::callbacks::gateway_callback)
                .post(gateway_callbacks::http::handlers::callbacks::gateway_callback),
        )
        .route("/ops/readiness", get(gateway_callbacks::http::handlers::ops::readiness))
        .route("/ops/liveness", get(gateway_callbacks::http::handlers::ops::liveness))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
