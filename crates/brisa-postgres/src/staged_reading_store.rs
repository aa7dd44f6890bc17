use crate::client::PostgresClient;
use crate::retry::{with_retry, RetryPolicy};
use async_trait::async_trait;
use brisa_domain::{
    DomainError, DomainResult, ProcessingOutcome, StageReadingInput, StagedReading,
    StagedReadingStore, ZeroMatchOutcome,
};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::{debug, instrument, warn};

/// One `staged_readings` row with its storage metadata.
#[derive(Debug, Clone)]
struct StagedReadingRow {
    id: i64,
    station_uid: String,
    recorded_at: i64,
    fields: serde_json::Value,
    processed: bool,
    success_count: Option<i32>,
    total_count: Option<i32>,
    processed_at: Option<DateTime<Utc>>,
    zero_match_count: i32,
    quarantined: bool,
    received_at: DateTime<Utc>,
}

impl From<&Row> for StagedReadingRow {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get(0),
            station_uid: row.get(1),
            recorded_at: row.get(2),
            fields: row.get(3),
            processed: row.get(4),
            success_count: row.get(5),
            total_count: row.get(6),
            processed_at: row.get(7),
            zero_match_count: row.get(8),
            quarantined: row.get(9),
            received_at: row.get(10),
        }
    }
}

impl From<StagedReadingRow> for StagedReading {
    fn from(row: StagedReadingRow) -> Self {
        StagedReading {
            id: row.id,
            station_uid: row.station_uid,
            recorded_at: row.recorded_at,
            fields: row.fields.as_object().cloned().unwrap_or_default(),
            processed: row.processed,
            success_count: row.success_count,
            total_count: row.total_count,
            processed_at: row.processed_at,
            zero_match_count: row.zero_match_count,
            quarantined: row.quarantined,
            received_at: row.received_at,
        }
    }
}

/// PostgreSQL implementation of the staging store.
#[derive(Clone)]
pub struct PostgresStagedReadingStore {
    client: PostgresClient,
    retry_policy: RetryPolicy,
}

impl PostgresStagedReadingStore {
    pub fn new(client: PostgresClient, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    async fn try_insert(&self, input: &StageReadingInput) -> anyhow::Result<StagedReading> {
        let conn = self.client.get_connection().await?;
        let fields = serde_json::Value::Object(input.fields.clone());

        let row = conn
            .query_one(
                "INSERT INTO staged_readings (station_uid, recorded_at, fields) \
                 VALUES ($1, $2, $3) \
                 RETURNING id, station_uid, recorded_at, fields, processed, success_count, \
                           total_count, processed_at, zero_match_count, quarantined, received_at",
                &[&input.station_uid, &input.recorded_at, &fields],
            )
            .await?;

        Ok(StagedReadingRow::from(&row).into())
    }
}

#[async_trait]
impl StagedReadingStore for PostgresStagedReadingStore {
    #[instrument(skip(self, input), fields(station_uid = %input.station_uid))]
    async fn insert_reading(&self, input: StageReadingInput) -> DomainResult<StagedReading> {
        let reading = with_retry(&self.retry_policy, "insert_reading", || {
            self.try_insert(&input)
        })
        .await
        .map_err(DomainError::RepositoryError)?;

        debug!(id = reading.id, "reading staged");
        Ok(reading)
    }

    #[instrument(skip(self))]
    async fn list_unprocessed(&self) -> DomainResult<Vec<StagedReading>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT id, station_uid, recorded_at, fields, processed, success_count, \
                        total_count, processed_at, zero_match_count, quarantined, received_at \
                 FROM staged_readings \
                 WHERE NOT processed AND NOT quarantined \
                 ORDER BY id",
                &[],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        debug!(count = rows.len(), "unprocessed readings fetched");

        Ok(rows
            .iter()
            .map(|row| StagedReadingRow::from(row).into())
            .collect())
    }

    #[instrument(
        skip(self, outcome),
        fields(success = outcome.success_count, total = outcome.total_count)
    )]
    async fn mark_processed(&self, id: i64, outcome: ProcessingOutcome) -> DomainResult<bool> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let affected = conn
            .execute(
                "UPDATE staged_readings \
                 SET processed = TRUE, success_count = $2, total_count = $3, processed_at = $4 \
                 WHERE id = $1",
                &[
                    &id,
                    &outcome.success_count,
                    &outcome.total_count,
                    &outcome.processed_at,
                ],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        if affected == 0 {
            warn!(id, "mark_processed matched no staged reading");
        }

        Ok(affected > 0)
    }

    #[instrument(skip(self))]
    async fn record_zero_match(
        &self,
        id: i64,
        quarantine_after: i32,
    ) -> DomainResult<Option<ZeroMatchOutcome>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "UPDATE staged_readings \
                 SET zero_match_count = zero_match_count + 1, \
                     quarantined = (zero_match_count + 1 >= $2) \
                 WHERE id = $1 AND NOT processed \
                 RETURNING zero_match_count, quarantined",
                &[&id, &quarantine_after],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| ZeroMatchOutcome {
            zero_match_count: row.get(0),
            quarantined: row.get(1),
        }))
    }
}
