use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Catalog document to index; the bundled sample catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Where engine snapshots are written and read
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Category for listings that match no category by label or description
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,

    /// Restore the snapshot at startup if one exists
    #[serde(default = "default_true")]
    pub restore_snapshot: bool,

    /// Write a snapshot during graceful shutdown
    #[serde(default = "default_true")]
    pub save_snapshot_on_shutdown: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_snapshot_path() -> String {
    "recommender_snapshot.json".to_string()
}

fn default_fallback_category() -> String {
    "Handyman".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
