//! Configuration loading: TOML file, then environment overrides, then validation.

use std::path::{Path, PathBuf};

use songdwh_core::{ConfigError, RawConfig, WarehouseConfig};
use thiserror::Error;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "dwh.toml";

/// Errors that can occur while loading the configuration.
#[derive(Error, Debug)]
pub enum LoadConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Parses and validates config text, applying overrides read through `lookup`.
pub fn parse_config<F>(
    text: &str,
    path: &Path,
    lookup: F,
) -> Result<WarehouseConfig, LoadConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw: RawConfig = toml::from_str(text).map_err(|source| LoadConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    raw.apply_overrides(lookup);

    WarehouseConfig::from_raw(raw).map_err(|source| LoadConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads `path` and applies `SONGDWH_<SECTION>_<KEY>` environment overrides.
pub fn load_config(path: &Path) -> Result<WarehouseConfig, LoadConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_config(&text, path, |key| std::env::var(key).ok())?;

    tracing::debug!(
        path = %path.display(),
        cluster = ?config.cluster,
        "Loaded configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use songdwh_core::{Dialect, TimestampUnit};

    const FULL: &str = r#"
[CLUSTER]
HOST = "dwhcluster.abc123.us-west-2.redshift.amazonaws.com"
DB_NAME = "dev"
DB_USER = "awsuser"
DB_PASSWORD = "Passw0rd"
DB_PORT = 5439

[S3]
SONG_DATA = "'s3://udacity-dend/song_data'"
LOG_DATA = "'s3://udacity-dend/log_data'"
LOG_JSONPATH = "'s3://udacity-dend/log_json_path.json'"
REGION = "us-west-2"

[IAM_ROLE]
ARN = "arn:aws:iam::123456789012:role/dwhRole"

[ETL]
TIMESTAMP_UNIT = "milliseconds"
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL, &path(), no_env).unwrap();

        assert_eq!(config.cluster.db_port, 5439);
        assert_eq!(config.cluster.dialect, Dialect::Redshift);
        assert_eq!(config.s3.unwrap().region, "us-west-2");
        assert_eq!(config.etl.timestamp_unit, TimestampUnit::Milliseconds);
        assert_eq!(config.etl.time_page_filter, "NextPage");
    }

    #[test]
    fn test_port_may_be_a_string() {
        let text = FULL.replace("DB_PORT = 5439", "DB_PORT = \"5439\"");
        let config = parse_config(&text, &path(), no_env).unwrap();

        assert_eq!(config.cluster.db_port, 5439);
    }

    #[test]
    fn test_environment_overrides_file() {
        let config = parse_config(FULL, &path(), |key| match key {
            "SONGDWH_CLUSTER_DB_PASSWORD" => Some("from-env".to_string()),
            "SONGDWH_CLUSTER_DIALECT" => Some("postgres".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.cluster.db_password, "from-env");
        assert_eq!(config.cluster.dialect, Dialect::Postgres);
    }

    #[test]
    fn test_cluster_only_config() {
        let text = r#"
[CLUSTER]
HOST = "localhost"
DB_NAME = "dev"
DB_USER = "postgres"
DB_PASSWORD = ""
DB_PORT = 5432
DIALECT = "postgres"
SSL_MODE = "disable"
"#;

        let config = parse_config(text, &path(), no_env).unwrap();
        assert!(config.s3.is_none());
        assert!(config.iam_role.is_none());
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_config("[CLUSTER\nHOST = 1", &path(), no_env).unwrap_err();

        assert!(matches!(err, LoadConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse config file dwh.toml"));
    }

    #[test]
    fn test_missing_setting() {
        let text = FULL.replace("DB_USER = \"awsuser\"\n", "");
        let err = parse_config(&text, &path(), no_env).unwrap_err();

        assert!(matches!(
            err,
            LoadConfigError::Invalid {
                source: ConfigError::MissingSetting {
                    section: "CLUSTER",
                    key: "DB_USER"
                },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/dwh.toml")).unwrap_err();
        assert!(matches!(err, LoadConfigError::Io { .. }));
    }
}
