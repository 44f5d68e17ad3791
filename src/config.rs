use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Location of a Spanner database, parsed from `DATABASE_URL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl DatabaseUrl {
    pub fn project_path(&self) -> String {
        format!("projects/{}", self.project)
    }

    pub fn instance_path(&self) -> String {
        format!("{}/instances/{}", self.project_path(), self.instance)
    }

    pub fn database_path(&self) -> String {
        format!("{}/databases/{}", self.instance_path(), self.database)
    }
}

impl FromStr for DatabaseUrl {
    type Err = anyhow::Error;

    /// Accepts `projects/P/instances/I/databases/D`, optionally prefixed with `spanner://`
    fn from_str(raw: &str) -> Result<Self> {
        let path = raw.trim().strip_prefix("spanner://").unwrap_or(raw.trim());
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

        match parts.as_slice() {
            ["projects", project, "instances", instance, "databases", database]
                if !project.is_empty() && !instance.is_empty() && !database.is_empty() =>
            {
                Ok(DatabaseUrl {
                    project: project.to_string(),
                    instance: instance.to_string(),
                    database: database.to_string(),
                })
            }
            _ => bail!(
                "expected 'projects/<project>/instances/<instance>/databases/<database>', got '{}'",
                raw
            ),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.database_path())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-memory store
    pub database_url: Option<DatabaseUrl>,
    pub spanner_emulator_host: Option<String>,
    pub service_port: u16,
    pub service_host: String,
    pub cors_enabled: bool,
    pub seed_sample_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            spanner_emulator_host: None,
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
            cors_enabled: true,
            seed_sample_data: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<DatabaseUrl>())
            .transpose()
            .context("DATABASE_URL must be a Spanner database path")?;

        let spanner_emulator_host = lookup("SPANNER_EMULATOR_HOST");

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let cors_enabled = parse_flag("CORS_ENABLED", lookup("CORS_ENABLED"), true)?;
        let seed_sample_data = parse_flag("SEED_SAMPLE_DATA", lookup("SEED_SAMPLE_DATA"), true)?;

        Ok(Config {
            database_url,
            spanner_emulator_host,
            service_port,
            service_host,
            cors_enabled,
            seed_sample_data,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        match &self.database_url {
            Some(url) => {
                tracing::info!("  Item store: spanner ({})", url);
                tracing::info!(
                    "  Spanner emulator: {}",
                    self.spanner_emulator_host
                        .as_deref()
                        .unwrap_or("disabled (using production)")
                );
            }
            None => {
                tracing::info!("  Item store: in-memory");
                tracing::info!("  Seed sample data: {}", self.seed_sample_data);
            }
        }
        tracing::info!("  CORS enabled: {}", self.cors_enabled);
        tracing::info!("  Service listening on: {}", self.server_address());
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("{} must be a boolean (true/false), got '{}'", name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_with_all_vars() {
        let config = config_from(&[
            ("DATABASE_URL", "projects/test-project/instances/test-instance/databases/test-db"),
            ("SPANNER_EMULATOR_HOST", "localhost:9010"),
            ("SERVICE_PORT", "8080"),
            ("SERVICE_HOST", "127.0.0.1"),
            ("CORS_ENABLED", "false"),
            ("SEED_SAMPLE_DATA", "no"),
        ])
        .unwrap();

        let url = config.database_url.unwrap();
        assert_eq!(url.project, "test-project");
        assert_eq!(url.instance, "test-instance");
        assert_eq!(url.database, "test-db");
        assert_eq!(config.spanner_emulator_host, Some("localhost:9010".to_string()));
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "127.0.0.1");
        assert!(!config.cors_enabled);
        assert!(!config.seed_sample_data);
    }

    #[test]
    fn test_config_with_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.spanner_emulator_host, None);
        assert_eq!(config.service_port, 3000);
        assert_eq!(config.service_host, "0.0.0.0");
        assert!(config.cors_enabled);
        assert!(config.seed_sample_data);
        assert_eq!(config.server_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_empty_database_url_selects_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_database_url() {
        let result = config_from(&[("DATABASE_URL", "postgres://localhost/items")]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from(&[("SERVICE_PORT", "not-a-number")]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let result = config_from(&[("SERVICE_PORT", "99999")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_flag() {
        let result = config_from(&[("CORS_ENABLED", "sometimes")]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("CORS_ENABLED"));
    }

    #[test]
    fn test_database_url_with_scheme() {
        let url: DatabaseUrl = "spanner://projects/p/instances/i/databases/d".parse().unwrap();
        assert_eq!(url.database_path(), "projects/p/instances/i/databases/d");
        assert_eq!(url.instance_path(), "projects/p/instances/i");
        assert_eq!(url.project_path(), "projects/p");
        assert_eq!(url.to_string(), "projects/p/instances/i/databases/d");
    }

    #[test]
    fn test_database_url_missing_segment() {
        assert!("projects/p/instances/i".parse::<DatabaseUrl>().is_err());
        assert!("projects//instances/i/databases/d".parse::<DatabaseUrl>().is_err());
    }
}
