use std::env;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::error::DirectoryError;
use crate::identity::StaticDirectory;
use crate::shape::{ConfiguredMetrics, MetricsPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    /// JSON identity table; the built-in table is used when unset.
    pub directory_path: Option<PathBuf>,
    pub metrics: MetricsPolicy,
    pub today: NaiveDate,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let metrics = match var("LMS_METRICS").as_deref().map(str::trim) {
            None | Some("") | Some("computed") => MetricsPolicy::Computed,
            Some("configured") => MetricsPolicy::Configured(ConfiguredMetrics::legacy()),
            Some(other) => {
                warn!(value = other, "unknown LMS_METRICS, using computed metrics");
                MetricsPolicy::Computed
            }
        };
        let today = var("LMS_TODAY")
            .and_then(|raw| match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(day) => Some(day),
                Err(_) => {
                    warn!(value = %raw, "LMS_TODAY is not YYYY-MM-DD, using the current date");
                    None
                }
            })
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            database_url: var("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            directory_path: var("LMS_DIRECTORY_PATH").map(PathBuf::from),
            metrics,
            today,
        }
    }

    pub fn directory(&self) -> Result<StaticDirectory, DirectoryError> {
        match &self.directory_path {
            Some(path) => StaticDirectory::load(path),
            None => Ok(StaticDirectory::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);
        assert!(config.database_url.is_none());
        assert!(config.directory_path.is_none());
        assert_eq!(config.metrics, MetricsPolicy::Computed);
        assert_eq!(config.directory().unwrap(), StaticDirectory::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/lms"),
            ("LMS_METRICS", "configured"),
            ("LMS_TODAY", "2025-06-15"),
        ]);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/lms"));
        assert_eq!(config.metrics, MetricsPolicy::Configured(ConfiguredMetrics::legacy()));
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config(&[
            ("LMS_METRICS", "fixed"),
            ("LMS_TODAY", "15/06/2025"),
            ("DATABASE_URL", " "),
        ]);
        assert_eq!(config.metrics, MetricsPolicy::Computed);
        assert!(config.database_url.is_none());
    }
}
