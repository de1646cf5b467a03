use std::{path::PathBuf, time::Duration};

use quotesync_connect::DEFAULT_API_URL;

pub struct Config {
    pub api_url: String,
    pub store_path: PathBuf,
    pub sync_interval: Duration,
    pub request_timeout: Duration,
    pub user_id: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let api_url = std::env::var("QS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let store_path = std::env::var("QS_STORE_PATH")
            .unwrap_or_else(|_| "./data/quotes.json".into())
            .into();
        let interval_secs: u64 = std::env::var("QS_SYNC_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .unwrap_or(60);
        let timeout_ms: u64 = std::env::var("QS_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let user_id: i64 = std::env::var("QS_USER_ID")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .unwrap_or(1);
        Self {
            api_url,
            store_path,
            sync_interval: Duration::from_secs(interval_secs.max(1)),
            request_timeout: Duration::from_millis(timeout_ms),
            user_id,
        }
    }
}
