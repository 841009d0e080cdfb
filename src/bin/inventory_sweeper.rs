use anyhow::Result;
use gateway_callbacks::config::AppConfig;
use gateway_callbacks::repo::dedup_repo::DedupRepo;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&cfg.database_url)
        .await?;

    let repo = DedupRepo { pool };

    loop {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(cfg.inventory_retention_days);
        match repo.delete_older_than(cutoff).await {
            Ok(0) => {}
            Ok(deleted) => {
                tracing::info!("swept {} gateway response records older than {}", deleted, cutoff);
            }
            Err(err) => {
                tracing::error!("inventory sweep failed: {:#}", err);
            }
        }

        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    }
}
