use std::env;

const DEFAULT_LOG_FILTER: &str = "biblioteca=info";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub profile: String,
    /// Fallback `tracing` filter when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Config {
    /// Read configuration from the process environment, after loading a
    /// `.env` file if one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = lookup("PROFILE").unwrap_or_else(|| "default".to_string());

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            if profile == "default" {
                "sqlite://biblioteca.db?mode=rwc".to_string()
            } else {
                format!("sqlite://biblioteca_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            profile,
        }
    }

    /// Throwaway store, mostly for tests
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            profile: "memory".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
