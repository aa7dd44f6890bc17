use chrono::{DateTime, NaiveDateTime, Utc};

/// Operational status of a station in the downstream catalog.
///
/// The catalog reports status as a free-form string; anything other than
/// the active marker is treated as inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Active,
    Inactive,
}

/// A weather station registered in the downstream catalog. Externally
/// owned; the bridge only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub status: StationStatus,
    pub sensors: Vec<Sensor>,
}

impl Station {
    pub fn is_active(&self) -> bool {
        self.status == StationStatus::Active
    }
}

/// A sensor binding on a station: which catalog parameter the station
/// reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub parameter_id: i64,
    pub name: String,
}

/// A measurable quantity in the downstream catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: i64,
    pub name: String,
    /// Raw field key configured in the catalog. When absent the key is
    /// derived from the display name.
    pub field_key: Option<String>,
}

/// One raw reading held in the staging store pending forwarding.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedReading {
    pub id: i64,
    pub station_uid: String,
    /// Unix seconds of observation as reported by the station. The sole
    /// source of event time.
    pub recorded_at: i64,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub processed: bool,
    pub success_count: Option<i32>,
    pub total_count: Option<i32>,
    pub processed_at: Option<DateTime<Utc>>,
    pub zero_match_count: i32,
    pub quarantined: bool,
    pub received_at: DateTime<Utc>,
}

/// Input for staging a new reading.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReadingInput {
    pub station_uid: String,
    pub recorded_at: i64,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Partial-success accounting recorded when a staged reading is marked
/// processed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOutcome {
    pub success_count: i32,
    pub total_count: i32,
    pub processed_at: DateTime<Utc>,
}

/// Result of recording one zero-match pass against a staged reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroMatchOutcome {
    pub zero_match_count: i32,
    pub quarantined: bool,
}

/// One resolved (parameter, value) pair bound for the downstream API.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station_id: i64,
    pub parameter_id: i64,
    pub value: f64,
    /// Event time, zone-less, second precision; matches the downstream
    /// wire format.
    pub measured_at: NaiveDateTime,
}
