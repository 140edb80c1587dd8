use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{OrderStore, StoreError};
use crate::models::order::{AssignmentOutcome, Coordinate, Order, OrderId, OrderStatus};

const UNASSIGNED: i64 = OrderStatus::Unassigned.code() as i64;
const TAKEN: i64 = OrderStatus::Taken.code() as i64;

pub struct SqlOrderStore {
    pool: SqlitePool,
}

impl SqlOrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and ensures the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;

        tracing::info!(max_connections, "order database ready");
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_latitude REAL NOT NULL,
                start_longitude REAL NOT NULL,
                end_latitude REAL NOT NULL,
                end_longitude REAL NOT NULL,
                distance_in_meters INTEGER NOT NULL CHECK (distance_in_meters >= 0),
                status INTEGER NOT NULL DEFAULT 0 CHECK (status IN (0, 1)),
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_order(row: &SqliteRow) -> Result<Order, StoreError> {
        let id: i64 = row.try_get("id")?;
        let distance: i64 = row.try_get("distance_in_meters")?;
        let code: i64 = row.try_get("status")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        let status = u8::try_from(code)
            .ok()
            .and_then(OrderStatus::from_code)
            .ok_or_else(|| StoreError::Corrupt(format!("order {id} has status code {code}")))?;

        Ok(Order {
            id: to_unsigned(id, "id")?,
            start: Coordinate::new(row.try_get("start_latitude")?, row.try_get("start_longitude")?),
            end: Coordinate::new(row.try_get("end_latitude")?, row.try_get("end_longitude")?),
            distance_meters: to_unsigned(distance, "distance_in_meters")?,
            status,
            created_at,
        })
    }
}

fn to_unsigned(value: i64, column: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {column}: {value}")))
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl OrderStore for SqlOrderStore {
    async fn create_order(
        &self,
        start: Coordinate,
        end: Coordinate,
        distance_meters: u64,
    ) -> Result<Order, StoreError> {
        let distance = i64::try_from(distance_meters)
            .map_err(|_| StoreError::Database(format!("distance {distance_meters} out of range")))?;
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO orders
                (start_latitude, start_longitude, end_latitude, end_longitude, distance_in_meters, status, created_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(start.lat)
        .bind(start.lng)
        .bind(end.lat)
        .bind(end.lng)
        .bind(distance)
        .bind(UNASSIGNED)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Order {
            id: to_unsigned(result.last_insert_rowid(), "id")?,
            start,
            end,
            distance_meters,
            status: OrderStatus::Unassigned,
            created_at,
        })
    }

    async fn try_assign(&self, id: OrderId) -> Result<AssignmentOutcome, StoreError> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(AssignmentOutcome::NotFound);
        };

        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(TAKEN)
            .bind(id)
            .bind(UNASSIGNED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(AssignmentOutcome::Assigned);
        }

        // Rows are never deleted and TAKEN is terminal, so an existing row here is taken.
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(if exists > 0 {
            AssignmentOutcome::AlreadyTaken
        } else {
            AssignmentOutcome::NotFound
        })
    }

    async fn list_range(&self, offset: u64, limit: u64) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, start_latitude, start_longitude, end_latitude, end_longitude,
                   distance_in_meters, status, created_at
            FROM orders
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(to_signed(limit))
        .bind(to_signed(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn count_orders(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        to_unsigned(count, "count")
    }
}
