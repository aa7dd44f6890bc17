use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a station-reported unix timestamp into the zone-less event time
/// used by the downstream API. An out-of-range timestamp falls back to the
/// current time rather than failing the reading.
pub fn unix_to_event_time(unix_seconds: i64) -> NaiveDateTime {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_else(|| Utc::now().naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_to_event_time() {
        let event_time = unix_to_event_time(1_700_000_000);

        assert_eq!(
            event_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2023-11-14T22:13:20"
        );
    }

    #[test]
    fn test_out_of_range_timestamp_falls_back_to_now() {
        let before = Utc::now().naive_utc();
        let event_time = unix_to_event_time(i64::MAX);
        let after = Utc::now().naive_utc();

        assert!(event_time >= before);
        assert!(event_time <= after);
    }
}
