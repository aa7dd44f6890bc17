use crate::error::{DomainError, DomainResult};
use serde::Deserialize;

/// Wire shape of one reading as published by a station.
///
/// Only the station uid and the timestamp are named; every other key is an
/// opaque scalar reading. Some station firmwares publish the timestamp as
/// `unixtime` instead of `unix_time`, so both spellings are accepted.
#[derive(Debug, Deserialize)]
struct RawReadingWire {
    uid: String,
    unix_time: Option<i64>,
    unixtime: Option<i64>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// A decoded station reading, before catalog validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub station_uid: String,
    pub recorded_at: i64,
    /// Numeric readings only; non-numeric extras are dropped at decode.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl RawReading {
    /// Decode a JSON message body into a reading.
    pub fn decode(payload: &[u8]) -> DomainResult<Self> {
        let wire: RawReadingWire = serde_json::from_slice(payload)
            .map_err(|e| DomainError::InvalidReading(e.to_string()))?;

        let recorded_at = wire
            .unix_time
            .or(wire.unixtime)
            .ok_or_else(|| DomainError::InvalidReading("missing unix_time field".to_string()))?;

        let fields = wire
            .extra
            .into_iter()
            .filter(|(_, value)| value.is_number())
            .collect();

        Ok(Self {
            station_uid: wire.uid,
            recorded_at,
            fields,
        })
    }
}
