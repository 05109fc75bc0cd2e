//! Append-only purchase ledger backed by SQLite

use crate::error::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;
use std::str::FromStr;

type StoreResult<T> = std::result::Result<T, StoreError>;

/// One declared share purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub symbol: String,
    pub shares: Decimal,
    pub price_per_share: Decimal,
    pub user_id: String,
    pub recorded_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Create a record stamped with the current time
    pub fn new(
        user_id: impl Into<String>,
        symbol: impl Into<String>,
        shares: Decimal,
        price_per_share: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into().to_ascii_uppercase(),
            shares,
            price_per_share,
            user_id: user_id.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Amount paid for this purchase
    pub fn cost(&self) -> Decimal {
        self.shares.saturating_mul(self.price_per_share)
    }

    /// Check the record invariants
    pub fn validate(&self) -> StoreResult<()> {
        if self.shares <= Decimal::ZERO {
            return Err(StoreError::InvalidRecord(format!(
                "shares must be positive, got {}",
                self.shares
            )));
        }
        if self.price_per_share <= Decimal::ZERO {
            return Err(StoreError::InvalidRecord(format!(
                "price must be positive, got {}",
                self.price_per_share
            )));
        }
        if self.shares.checked_mul(self.price_per_share).is_none() {
            return Err(StoreError::InvalidRecord(
                "purchase amount out of range".to_string(),
            ));
        }
        if self.symbol.is_empty() || self.user_id.is_empty() {
            return Err(StoreError::InvalidRecord(
                "symbol and user are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    symbol: String,
    price: String,
    shares: String,
    user: String,
    recorded_at: String,
}

impl PurchaseRow {
    fn into_record(self) -> StoreResult<PurchaseRecord> {
        let corrupt = |field: &str, value: &str| {
            StoreError::Unavailable(format!("corrupt {field} in ledger: {value:?}"))
        };

        let shares = Decimal::from_str(&self.shares).map_err(|_| corrupt("shares", &self.shares))?;
        let price_per_share =
            Decimal::from_str(&self.price).map_err(|_| corrupt("price", &self.price))?;
        let recorded_at = DateTime::parse_from_rfc3339(&self.recorded_at)
            .map_err(|_| corrupt("recorded_at", &self.recorded_at))?
            .with_timezone(&Utc);

        Ok(PurchaseRecord {
            symbol: self.symbol,
            shares,
            price_per_share,
            user_id: self.user,
            recorded_at,
        })
    }
}

/// Fixed-width timestamp so text ordering matches time ordering
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Purchase ledger over a shared SQLite pool
#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    pool: SqlitePool,
}

impl PortfolioLedger {
    /// Wrap an existing pool. Call [`init`](Self::init) once before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and make
    /// sure the schema exists
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one
        // connection alive for the pool's lifetime.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let ledger = Self::new(pool);
        ledger.init().await?;
        Ok(ledger)
    }

    /// Create the ledger table and index if absent
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS purchase_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                price TEXT NOT NULL,
                shares TEXT NOT NULL,
                user TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_purchase_records_user_symbol ON purchase_records(user, symbol, recorded_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append one record. Invalid records are rejected before touching the store.
    pub async fn append(&self, record: &PurchaseRecord) -> StoreResult<()> {
        record.validate()?;

        sqlx::query(
            "INSERT INTO purchase_records (symbol, price, shares, user, recorded_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.symbol)
        .bind(record.price_per_share.to_string())
        .bind(record.shares.to_string())
        .bind(&record.user_id)
        .bind(encode_timestamp(&record.recorded_at))
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            user = %record.user_id,
            symbol = %record.symbol,
            shares = %record.shares,
            price = %record.price_per_share,
            "Recorded purchase"
        );
        Ok(())
    }

    /// All records for `user_id`, optionally limited to one symbol, oldest first
    pub async fn records_for(
        &self,
        user_id: &str,
        symbol: Option<&str>,
    ) -> StoreResult<Vec<PurchaseRecord>> {
        let rows: Vec<PurchaseRow> = match symbol {
            Some(symbol) => {
                sqlx::query_as(
                    "SELECT symbol, price, shares, user, recorded_at FROM purchase_records \
                     WHERE user = ? AND symbol = ? ORDER BY recorded_at, id",
                )
                .bind(user_id)
                .bind(symbol.to_ascii_uppercase())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT symbol, price, shares, user, recorded_at FROM purchase_records \
                     WHERE user = ? ORDER BY recorded_at, id",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(PurchaseRow::into_record).collect()
    }

    /// Records for `user_id` grouped by symbol
    pub async fn holdings(
        &self,
        user_id: &str,
    ) -> StoreResult<BTreeMap<String, Vec<PurchaseRecord>>> {
        let records = self.records_for(user_id, None).await?;
        Ok(super::group_by_symbol(records))
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
