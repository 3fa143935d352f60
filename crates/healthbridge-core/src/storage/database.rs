//! SQLite-backed health store.
//!
//! Stands in for the host store on machines that have none (a simulator
//! side, or the CLI). Provides persistent storage for:
//! - Samples of any catalog type
//! - Per-type share/read grants
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that string
//! comparison in SQL is chronological. Fixed width holds because samples are
//! confined to years 0000-9999 and query bounds are clamped to that range.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, MetricType};
use crate::error::StoreError;
use crate::gateway::HealthStore;
use crate::sample::{clamp_to_sample_range, Metadata, Sample, SamplePayload};
use crate::units::{Quantity, Unit};

/// SQLite database of samples and authorization grants.
pub struct SqliteHealthStore {
    conn: Arc<Mutex<Connection>>,
}

/// Fixed-width only for years 0000-9999; see [`clamp_to_sample_range`].
fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{value}': {e}")))
}

struct SampleRow {
    uuid: String,
    sample_type: String,
    start_date: String,
    end_date: String,
    quantity: Option<f64>,
    unit: Option<String>,
    category_value: Option<i64>,
    metadata: Option<String>,
}

impl SampleRow {
    fn into_sample(self) -> Result<Sample, StoreError> {
        let corrupt = |what: &str| StoreError::Corrupt(format!("sample {}: {what}", self.uuid));

        let metric = catalog::resolve(&self.sample_type).ok_or_else(|| corrupt("unknown type"))?;
        let payload = match metric {
            MetricType::Quantity(_) => {
                let value = self.quantity.ok_or_else(|| corrupt("missing quantity"))?;
                let unit = self
                    .unit
                    .as_deref()
                    .and_then(|u| Unit::parse(u).ok())
                    .ok_or_else(|| corrupt("missing or bad unit"))?;
                SamplePayload::Quantity(Quantity::new(value, unit))
            }
            MetricType::Category(_) => {
                SamplePayload::Category(self.category_value.ok_or_else(|| corrupt("missing value"))?)
            }
        };
        let metadata = match &self.metadata {
            Some(json) => Some(
                serde_json::from_str::<Metadata>(json).map_err(|_| corrupt("bad metadata"))?,
            ),
            None => None,
        };
        let uuid = Uuid::parse_str(&self.uuid).map_err(|_| corrupt("bad uuid"))?;
        let start = parse_ts(&self.start_date)?;
        let end = parse_ts(&self.end_date)?;

        Ok(Sample::new(metric, payload, start, end)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?
            .with_uuid(uuid)
            .with_metadata(metadata))
    }
}

impl SqliteHealthStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS samples (
                uuid            TEXT PRIMARY KEY,
                sample_type     TEXT NOT NULL,
                start_date      TEXT NOT NULL,
                end_date        TEXT NOT NULL,
                quantity        REAL,
                unit            TEXT,
                category_value  INTEGER,
                metadata        TEXT
            );

            CREATE TABLE IF NOT EXISTS authorizations (
                sample_type TEXT PRIMARY KEY,
                can_share   INTEGER NOT NULL DEFAULT 0,
                can_read    INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_samples_type_start ON samples(sample_type, start_date);",
        )
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
            f(&mut guard)
        })
        .await?
    }

    fn granted(conn: &Connection, metric: MetricType, column: &str) -> Result<bool, rusqlite::Error> {
        let sql = format!("SELECT COUNT(*) FROM authorizations WHERE sample_type = ?1 AND {column} = 1");
        let count: i64 = conn.query_row(&sql, params![metric.identifier()], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Number of stored samples of `metric`, regardless of grants.
    pub async fn count(&self, metric: MetricType) -> Result<u64, StoreError> {
        self.with_conn(move |conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM samples WHERE sample_type = ?1",
                params![metric.identifier()],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        })
        .await
    }
}

#[async_trait]
impl HealthStore for SqliteHealthStore {
    fn supports(&self, _metric: MetricType) -> bool {
        true
    }

    async fn request_authorization(
        &self,
        share: &BTreeSet<MetricType>,
        read: &BTreeSet<MetricType>,
    ) -> Result<(), StoreError> {
        let grants: Vec<(MetricType, bool, bool)> = share
            .union(read)
            .map(|m| (*m, share.contains(m), read.contains(m)))
            .collect();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO authorizations (sample_type, can_share, can_read)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(sample_type) DO UPDATE SET
                        can_share = MAX(can_share, excluded.can_share),
                        can_read = MAX(can_read, excluded.can_read)",
                )?;
                for (metric, can_share, can_read) in &grants {
                    stmt.execute(params![metric.identifier(), can_share, can_read])?;
                }
            }
            tx.commit()?;
            debug!(types = grants.len(), "authorization grants recorded");
            Ok(())
        })
        .await
    }

    async fn query(
        &self,
        metric: MetricType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, StoreError> {
        let (start, end) = (clamp_to_sample_range(start), clamp_to_sample_range(end));
        self.with_conn(move |conn| {
            if !Self::granted(conn, metric, "can_read")? {
                return Ok(Vec::new());
            }
            let mut stmt = conn.prepare(
                "SELECT uuid, sample_type, start_date, end_date, quantity, unit, category_value, metadata
                 FROM samples
                 WHERE sample_type = ?1 AND start_date <= ?2 AND end_date >= ?3
                 ORDER BY start_date DESC",
            )?;
            let rows = stmt
                .query_map(params![metric.identifier(), ts(end), ts(start)], |row| {
                    Ok(SampleRow {
                        uuid: row.get(0)?,
                        sample_type: row.get(1)?,
                        start_date: row.get(2)?,
                        end_date: row.get(3)?,
                        quantity: row.get(4)?,
                        unit: row.get(5)?,
                        category_value: row.get(6)?,
                        metadata: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(SampleRow::into_sample).collect()
        })
        .await
    }

    async fn save(&self, samples: &[Sample]) -> Result<(), StoreError> {
        let samples = samples.to_vec();
        self.with_conn(move |conn| {
            let metrics: BTreeSet<MetricType> = samples.iter().map(Sample::metric).collect();
            for metric in &metrics {
                if !Self::granted(conn, *metric, "can_share")? {
                    return Err(StoreError::Denied(format!("not authorized to share {metric}")));
                }
            }

            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO samples
                        (uuid, sample_type, start_date, end_date, quantity, unit, category_value, metadata)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for sample in &samples {
                    let (quantity, unit) = match sample.quantity_value() {
                        Some(q) => (Some(q.value), Some(q.unit.symbol())),
                        None => (None, None),
                    };
                    let metadata = sample
                        .metadata()
                        .map(serde_json::to_string)
                        .transpose()
                        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                    stmt.execute(params![
                        sample.uuid().to_string(),
                        sample.metric().identifier(),
                        ts(sample.start()),
                        ts(sample.end()),
                        quantity,
                        unit,
                        sample.category_value(),
                        metadata,
                    ])?;
                }
            }
            tx.commit()?;
            debug!(count = samples.len(), "samples written");
            Ok(())
        })
        .await
    }
}
