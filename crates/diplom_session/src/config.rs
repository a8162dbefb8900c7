use std::path::PathBuf;
use std::time::Duration;

use diplom_core::{FunnelVariant, TASKS_SETTLE_DELAY};
use diplom_engine::ClientSettings;

/// Environment variable holding the service base address.
pub const API_URL_ENV: &str = "DIPLOM_API_URL";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub client: ClientSettings,
    /// Time after the first goal before an empty task stage is revealed.
    pub settle_delay: Duration,
    /// Where built documents are written.
    pub download_dir: PathBuf,
    pub variant: FunnelVariant,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let download_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("downloads");
        Self {
            client: ClientSettings::default(),
            settle_delay: TASKS_SETTLE_DELAY,
            download_dir,
            variant: FunnelVariant::default(),
        }
    }
}

impl SessionConfig {
    /// Defaults, with the base address taken from `DIPLOM_API_URL` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(address) = lookup(API_URL_ENV) {
            let address = address.trim();
            if !address.is_empty() {
                config.client.base_url = address.to_string();
            }
        }
        config
    }
}
