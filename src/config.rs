use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Stamped on every scanned file so the same path on two machines stays distinct.
    pub host_id: String,
    /// Directory synced when a request names none.
    pub default_root: Option<PathBuf>,
    pub rider_weight_kg: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let host_id = std::env::var("ACTIVITY_SYNC_HOST_ID")
            .or_else(|_| std::env::var("HOSTNAME"))
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        let default_root = std::env::var("ACTIVITY_SYNC_ROOT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let rider_weight_kg = std::env::var("RIDER_WEIGHT_KG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(70.0);

        Self {
            port,
            host_id,
            default_root,
            rider_weight_kg,
        }
    }
}
