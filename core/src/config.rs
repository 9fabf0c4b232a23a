//! Client configuration
//!
//! Values come from `TASKBOARD_*` environment variables with defaults for
//! everything, so a bare `ClientConfig::from_env()` always succeeds.

use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/todos";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Configuration for the repository client and the pagination window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the tasks resource
    pub api_url: String,
    /// Items revealed per pagination step
    pub page_size: usize,
    /// Seed for demo-field enrichment
    pub seed: Option<u64>,
    /// Use the in-memory repository instead of HTTP
    pub offline: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            seed: None,
            offline: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("TASKBOARD_API_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let page_size = match lookup("TASKBOARD_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("Ignoring invalid TASKBOARD_PAGE_SIZE={:?}", raw);
                    defaults.page_size
                }
            },
            None => defaults.page_size,
        };

        let seed = lookup("TASKBOARD_SEED").and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!("Ignoring invalid TASKBOARD_SEED={:?}", raw);
                None
            }
        });

        let offline = env_flag(lookup("TASKBOARD_OFFLINE"), defaults.offline);

        Self {
            api_url,
            page_size,
            seed,
            offline,
        }
    }
}

fn env_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}
