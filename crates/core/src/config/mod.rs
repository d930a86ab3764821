//! Validated warehouse configuration.
//!
//! [`RawConfig`] mirrors the file; [`WarehouseConfig`] is what the rest of the
//! pipeline consumes. Conversion is a pure function so every rule here is
//! testable without touching the filesystem or the environment.

mod error;
mod raw;

use std::fmt;
use std::time::Duration;

pub use error::{ConfigError, Result};
pub use raw::{env_key, IntValue, RawCluster, RawConfig, RawEtl, RawIamRole, RawS3, ENV_PREFIX};

use crate::catalog::Dialect;
use crate::time::TimestampUnit;

/// Region used by the bulk-load statements when `S3.REGION` is not set.
pub const DEFAULT_REGION: &str = "us-east-2";

/// Page filter of the time-dimension insert when `ETL.TIME_PAGE_FILTER` is not set.
pub const DEFAULT_TIME_PAGE_FILTER: &str = "NextPage";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// TLS negotiation mode for the warehouse connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

impl SslMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "disable" => Some(Self::Disable),
            "prefer" => Some(Self::Prefer),
            "require" => Some(Self::Require),
            _ => None,
        }
    }
}

/// Warehouse connection parameters (`[CLUSTER]`).
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_port: u16,
    pub dialect: Dialect,
    pub ssl_mode: SslMode,
    pub connect_timeout_secs: u64,
}

impl ClusterConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `user@host:port/db`, safe to log.
    pub fn target_display(&self) -> String {
        format!(
            "{}@{}:{}/{} ({})",
            self.db_user,
            self.host,
            self.db_port,
            self.db_name,
            self.dialect.as_str()
        )
    }
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_port", &self.db_port)
            .field("dialect", &self.dialect)
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Object-storage sources of the bulk loads (`[S3]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub song_data: String,
    pub log_data: String,
    /// JSONPaths file for the event logs; `None` means `'auto'`.
    pub log_jsonpath: Option<String>,
    pub region: String,
}

/// Role the warehouse assumes to read from object storage (`[IAM_ROLE]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamRoleConfig {
    pub arn: String,
}

/// Transformation options (`[ETL]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub timestamp_unit: TimestampUnit,
    pub time_page_filter: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            timestamp_unit: TimestampUnit::default(),
            time_page_filter: DEFAULT_TIME_PAGE_FILTER.to_string(),
        }
    }
}

/// Complete, validated pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    pub cluster: ClusterConfig,
    pub s3: Option<S3Config>,
    pub iam_role: Option<IamRoleConfig>,
    pub etl: EtlConfig,
}

impl WarehouseConfig {
    /// Validates a raw configuration.
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let cluster = validate_cluster(raw.cluster)?;
        let s3 = raw.s3.map(validate_s3).transpose()?;
        let iam_role = raw.iam_role.map(validate_iam_role).transpose()?;
        let etl = raw.etl.map(validate_etl).transpose()?.unwrap_or_default();

        Ok(Self {
            cluster,
            s3,
            iam_role,
            etl,
        })
    }
}

fn required(section: &'static str, key: &'static str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingSetting { section, key }),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(section: &'static str, key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_port(value: &IntValue) -> Result<u16> {
    let text = value.as_text();
    match text.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid(
            "CLUSTER",
            "DB_PORT",
            &text,
            "expected a port number between 1 and 65535",
        )),
        Ok(port) => Ok(port),
    }
}

fn validate_cluster(raw: RawCluster) -> Result<ClusterConfig> {
    let host = required("CLUSTER", "HOST", raw.host)?;
    let db_name = required("CLUSTER", "DB_NAME", raw.db_name)?;
    let db_user = required("CLUSTER", "DB_USER", raw.db_user)?;
    // Passwords are taken verbatim: surrounding whitespace may be significant.
    let db_password = raw.db_password.ok_or(ConfigError::MissingSetting {
        section: "CLUSTER",
        key: "DB_PASSWORD",
    })?;
    let db_port = match &raw.db_port {
        Some(value) => parse_port(value)?,
        None => {
            return Err(ConfigError::MissingSetting {
                section: "CLUSTER",
                key: "DB_PORT",
            })
        }
    };

    let dialect = match optional(raw.dialect) {
        Some(name) => Dialect::from_name(&name).ok_or_else(|| {
            invalid("CLUSTER", "DIALECT", &name, "expected redshift or postgres")
        })?,
        None => Dialect::default(),
    };

    let ssl_mode = match optional(raw.ssl_mode) {
        Some(name) => SslMode::from_name(&name).ok_or_else(|| {
            invalid(
                "CLUSTER",
                "SSL_MODE",
                &name,
                "expected disable, prefer or require",
            )
        })?,
        None => SslMode::default(),
    };

    let connect_timeout_secs = match &raw.connect_timeout_secs {
        Some(value) => {
            let text = value.as_text();
            match text.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "CLUSTER",
                        "CONNECT_TIMEOUT_SECS",
                        &text,
                        "expected a positive number of seconds",
                    ))
                }
            }
        }
        None => DEFAULT_CONNECT_TIMEOUT_SECS,
    };

    Ok(ClusterConfig {
        host,
        db_name,
        db_user,
        db_password,
        db_port,
        dialect,
        ssl_mode,
        connect_timeout_secs,
    })
}

fn validate_s3(raw: RawS3) -> Result<S3Config> {
    Ok(S3Config {
        song_data: required("S3", "SONG_DATA", raw.song_data)?,
        log_data: required("S3", "LOG_DATA", raw.log_data)?,
        log_jsonpath: optional(raw.log_jsonpath),
        region: optional(raw.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
    })
}

fn validate_iam_role(raw: RawIamRole) -> Result<IamRoleConfig> {
    Ok(IamRoleConfig {
        arn: required("IAM_ROLE", "ARN", raw.arn)?,
    })
}

fn validate_etl(raw: RawEtl) -> Result<EtlConfig> {
    let timestamp_unit = match optional(raw.timestamp_unit) {
        Some(name) => TimestampUnit::from_name(&name).ok_or_else(|| {
            invalid(
                "ETL",
                "TIMESTAMP_UNIT",
                &name,
                "expected seconds or milliseconds",
            )
        })?,
        None => TimestampUnit::default(),
    };

    Ok(EtlConfig {
        timestamp_unit,
        time_page_filter: optional(raw.time_page_filter)
            .unwrap_or_else(|| DEFAULT_TIME_PAGE_FILTER.to_string()),
    })
}
