use crate::error::StoreError;
use crate::store::ActivityStore;

/// Lookup failures are returned, never read as "not a duplicate".
pub fn exists(
    store: &dyn ActivityStore,
    start_time_iso: &str,
    duration_seconds: f64,
) -> Result<bool, StoreError> {
    Ok(store
        .find_existing(start_time_iso, duration_seconds)?
        .is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::activity::{to_iso, ActivityFile, CanonicalActivity, StreamSet};
    use crate::types::sport::Sport;
    use chrono::{DateTime, Duration, Utc};

    struct BrokenStore;

    impl ActivityStore for BrokenStore {
        fn find_existing(&self, _: &str, _: f64) -> Result<Option<CanonicalActivity>, StoreError> {
            Err(StoreError::Unavailable("disk gone".into()))
        }
        fn save(&self, _: CanonicalActivity, _: StreamSet) -> Result<String, StoreError> {
            unreachable!()
        }
        fn is_file_known(&self, _: &ActivityFile) -> Result<bool, StoreError> {
            unreachable!()
        }
        fn record_file(&self, _: &ActivityFile) -> Result<(), StoreError> {
            unreachable!()
        }
    }

    fn stored(start: DateTime<Utc>, seconds: i64) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .save(
                CanonicalActivity {
                    id: "x".into(),
                    sport_type: Sport::Ride,
                    display_type: Sport::Ride,
                    name: "Morning Ride".into(),
                    start_time: start,
                    end_time: start + Duration::seconds(seconds),
                    distance_raw: 1.0,
                    elevation_gain_raw: 0.0,
                    has_power_meter: false,
                    trainer: false,
                    commute: None,
                },
                StreamSet::default(),
            )
            .unwrap();
        store
    }

    #[test]
    fn exact_match_only() {
        let start = "2024-04-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let store = stored(start, 1800);

        assert!(exists(&store, &to_iso(start), 1800.0).unwrap());
        assert!(!exists(&store, &to_iso(start), 1801.0).unwrap());
        assert!(!exists(&store, &to_iso(start), 1799.999).unwrap());
        assert!(!exists(&store, &to_iso(start + Duration::seconds(1)), 1800.0).unwrap());
        assert!(!exists(&store, &to_iso(start + Duration::milliseconds(1)), 1800.0).unwrap());
    }

    #[test]
    fn lookup_failures_propagate() {
        assert!(matches!(
            exists(&BrokenStore, "2024-04-01T08:00:00.000Z", 1.0),
            Err(StoreError::Unavailable(_))
        ));
    }
}
