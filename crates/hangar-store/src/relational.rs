//! PostgreSQL backend.

use async_trait::async_trait;
use hangar_core::models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, NewCommunication, UserCredential,
};
use hangar_core::ValidationError;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::Connection;
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::{BackendKind, StorageBackend};
use crate::codec::{AircraftRow, CommunicationRow, InventoryRow};
use crate::config::RelationalConfig;
use crate::error::{StorageError, StorageResult};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// One caller per session, so a small pool is enough.
const MAX_CONNECTIONS: u32 = 2;

/// Relational store over a PostgreSQL connection pool.
///
/// Each mutating call commits on its own; there is no cross-call transaction.
#[derive(Clone, Debug)]
pub struct RelationalBackend {
    pool: PgPool,
}

impl RelationalBackend {
    /// Connect and bootstrap the schema.
    ///
    /// Any failure (unreachable host, rejected credentials, schema error) is
    /// reported as `StorageError::Connection`.
    pub async fn connect(config: &RelationalConfig, timeout: Duration) -> StorageResult<Self> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        info!(
            "Connecting to relational store {}@{}:{}/{}",
            config.user, config.host, config.port, config.database
        );

        // Single attempt, no retry. The pool is only built once this succeeds.
        let attempt = PgConnection::connect_with(&options);
        let first = match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(StorageError::connection(e.to_string())),
            Err(_) => {
                return Err(StorageError::connection(format!(
                    "timed out after {}s",
                    timeout.as_secs_f64()
                )))
            }
        };
        if let Err(e) = first.close().await {
            debug!("Closing first connection failed: {}", e);
        }

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(timeout)
            .connect_lazy_with(options);

        let backend = Self { pool };
        if let Err(e) = backend.bootstrap_schema().await {
            backend.pool.close().await;
            return Err(StorageError::connection(format!("schema bootstrap failed: {e}")));
        }

        Ok(backend)
    }

    async fn bootstrap_schema(&self) -> StorageResult<()> {
        for statement in schema_statements(SCHEMA_SQL) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        debug!("Relational schema ready");
        Ok(())
    }
}

/// Split a SQL script into statements, dropping `--` comment lines.
fn schema_statements(script: &str) -> Vec<String> {
    let stripped: String = script
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    stripped
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl StorageBackend for RelationalBackend {
    async fn upsert_aircraft(&self, record: &AircraftRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO aircraft (aircraft_id, type, latitude, longitude, altitude, speed, heading, last_update)
            VALUES ($1, $2, $3, $4, $5, $6, $7, CURRENT_TIMESTAMP)
            ON CONFLICT (aircraft_id) DO UPDATE SET
                type = EXCLUDED.type,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                altitude = EXCLUDED.altitude,
                speed = EXCLUDED.speed,
                heading = EXCLUDED.heading,
                last_update = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.aircraft_id)
        .bind(&record.aircraft_type)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.altitude)
        .bind(record.speed)
        .bind(record.heading)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_aircraft(&self) -> StorageResult<Vec<AircraftRecord>> {
        let rows = sqlx::query_as::<_, AircraftRow>(
            "SELECT aircraft_id, type, latitude, longitude, altitude, speed, heading, last_update FROM aircraft",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AircraftRecord::from).collect())
    }

    async fn upsert_inventory_item(&self, item: &InventoryItem) -> StorageResult<()> {
        let quantity = i32::try_from(item.quantity)
            .map_err(|_| ValidationError::QuantityOverflow(item.quantity))?;

        sqlx::query(
            r#"
            INSERT INTO inventory (item_id, item_name, quantity, status, last_updated)
            VALUES ($1, $2, $3, $4, CURRENT_DATE)
            ON CONFLICT (item_id) DO UPDATE SET
                item_name = EXCLUDED.item_name,
                quantity = EXCLUDED.quantity,
                status = EXCLUDED.status,
                last_updated = CURRENT_DATE
            "#,
        )
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(quantity)
        .bind(item.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_inventory(&self) -> StorageResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            "SELECT item_id, item_name, quantity, status, last_updated FROM inventory",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InventoryItem::try_from).collect()
    }

    async fn append_communication(&self, entry: &NewCommunication) -> StorageResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO communications (message_type, priority, message, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&entry.message_type)
        .bind(entry.priority.as_str())
        .bind(&entry.message)
        .bind(entry.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_communications(
        &self,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CommunicationLogEntry>> {
        // LIMIT NULL is no limit in PostgreSQL.
        let limit = limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));

        let rows = sqlx::query_as::<_, CommunicationRow>(
            r#"
            SELECT id, timestamp, message_type, priority, message, status
            FROM communications
            ORDER BY timestamp DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CommunicationLogEntry::try_from).collect()
    }

    async fn user_exists(&self, username: &str) -> StorageResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn check_credentials(&self, username: &str, password_hash: &str) -> StorageResult<bool> {
        let stored = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stored.is_some_and(|hash| hash == password_hash))
    }

    async fn add_user(&self, credential: &UserCredential) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::duplicate_user(&credential.username));
        }
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        self.pool.close().await;
        info!("Relational store connection closed");
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }
}
