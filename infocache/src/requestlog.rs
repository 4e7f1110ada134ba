//! Postgres-backed request log, seeded with lookup requests at the
//! admin boundary and aggregated by the popularity publisher to find
//! what is worth re-warming.

use async_trait::async_trait;
use shared::{Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{LoggedRequest, PopularRequest};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 8;

#[async_trait]
pub trait RequestLog: Send + Sync + 'static {
    /// Records a single lookup. Failures are surfaced to the caller but
    /// never block serving the actual response.
    async fn save(&self, request: LoggedRequest) -> Result<()>;

    /// The most requested lookups over the trailing day, top five per
    /// kind. Recomputed on every call.
    async fn top_requests(&self) -> Result<Vec<PopularRequest>>;
}

pub async fn connect_postgres(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(url)
        .await
        .map_err(|e| Error::Database(format!("postgres connect: {e}")))?;
    info!("connected to postgres");
    Ok(pool)
}

pub struct PgRequestLog {
    pool: PgPool,
}

impl PgRequestLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TOP_REQUESTS_SQL: &str = r#"
SELECT * FROM (
    SELECT 'weather' AS kind,
           jsonb_build_object('city', args->>'city') AS args,
           COUNT(*) AS cnt
    FROM scheduled_tasks
    WHERE title = 'weather'
      AND created_at >= NOW() - INTERVAL '24 hours'
      AND args ? 'city'
    GROUP BY args->>'city'
    ORDER BY cnt DESC
    LIMIT 5
) AS weather_top
UNION ALL
SELECT * FROM (
    SELECT 'exchange' AS kind,
           jsonb_build_object('base', args->>'base', 'target', args->>'target') AS args,
           COUNT(*) AS cnt
    FROM scheduled_tasks
    WHERE title = 'exchange'
      AND created_at >= NOW() - INTERVAL '24 hours'
      AND args ? 'base' AND args ? 'target'
    GROUP BY args->>'base', args->>'target'
    ORDER BY cnt DESC
    LIMIT 5
) AS exchange_top
"#;

#[async_trait]
impl RequestLog for PgRequestLog {
    async fn save(&self, request: LoggedRequest) -> Result<()> {
        let args = serde_json::to_value(&request.args)
            .map_err(|e| Error::Database(format!("encode args: {e}")))?;
        sqlx::query("INSERT INTO scheduled_tasks (title, args, created_at) VALUES ($1, $2, $3)")
            .bind(&request.kind)
            .bind(args)
            .bind(request.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("save request: {e}")))?;
        Ok(())
    }

    async fn top_requests(&self) -> Result<Vec<PopularRequest>> {
        let rows: Vec<(String, serde_json::Value, i64)> = sqlx::query_as(TOP_REQUESTS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("top requests: {e}")))?;

        let mut top = Vec::with_capacity(rows.len());
        for (kind, args, _count) in rows {
            match serde_json::from_value::<HashMap<String, String>>(args) {
                Ok(args) => top.push(PopularRequest { kind, args }),
                Err(e) => warn!(%kind, error = %e, "malformed args row, skipping"),
            }
        }
        Ok(top)
    }
}
