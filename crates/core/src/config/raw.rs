//! Unvalidated configuration as read from the config file.
//!
//! Section and key names follow the `dwh.cfg` layout: `[CLUSTER]`, `[S3]`,
//! `[IAM_ROLE]`, plus an optional `[ETL]` section.

use serde::Deserialize;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "SONGDWH";

/// Environment variable name for a `section.key` setting.
pub fn env_key(section: &str, key: &str) -> String {
    format!("{ENV_PREFIX}_{section}_{key}")
}

/// An integer that may be written as a number or as a string.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IntValue {
    Int(i64),
    Text(String),
}

impl IntValue {
    pub fn as_text(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawConfig {
    #[serde(rename = "CLUSTER")]
    pub cluster: RawCluster,
    #[serde(rename = "S3")]
    pub s3: Option<RawS3>,
    #[serde(rename = "IAM_ROLE")]
    pub iam_role: Option<RawIamRole>,
    #[serde(rename = "ETL")]
    pub etl: Option<RawEtl>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawCluster {
    pub host: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_port: Option<IntValue>,
    pub dialect: Option<String>,
    pub ssl_mode: Option<String>,
    pub connect_timeout_secs: Option<IntValue>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawS3 {
    pub song_data: Option<String>,
    pub log_data: Option<String>,
    pub log_jsonpath: Option<String>,
    pub region: Option<String>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawIamRole {
    pub arn: Option<String>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawEtl {
    pub timestamp_unit: Option<String>,
    pub time_page_filter: Option<String>,
}

fn override_text(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *target = Some(value);
    }
}

fn override_int(target: &mut Option<IntValue>, value: Option<String>) {
    if let Some(value) = value {
        *target = Some(IntValue::Text(value));
    }
}

impl RawConfig {
    /// Applies `SONGDWH_<SECTION>_<KEY>` overrides using `lookup` to read them.
    ///
    /// Optional sections are only created when at least one of their keys is
    /// overridden.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |section: &str, key: &str| lookup(&env_key(section, key));

        let cluster = &mut self.cluster;
        override_text(&mut cluster.host, get("CLUSTER", "HOST"));
        override_text(&mut cluster.db_name, get("CLUSTER", "DB_NAME"));
        override_text(&mut cluster.db_user, get("CLUSTER", "DB_USER"));
        override_text(&mut cluster.db_password, get("CLUSTER", "DB_PASSWORD"));
        override_int(&mut cluster.db_port, get("CLUSTER", "DB_PORT"));
        override_text(&mut cluster.dialect, get("CLUSTER", "DIALECT"));
        override_text(&mut cluster.ssl_mode, get("CLUSTER", "SSL_MODE"));
        override_int(
            &mut cluster.connect_timeout_secs,
            get("CLUSTER", "CONNECT_TIMEOUT_SECS"),
        );

        let song_data = get("S3", "SONG_DATA");
        let log_data = get("S3", "LOG_DATA");
        let log_jsonpath = get("S3", "LOG_JSONPATH");
        let region = get("S3", "REGION");
        if song_data.is_some() || log_data.is_some() || log_jsonpath.is_some() || region.is_some()
        {
            let s3 = self.s3.get_or_insert_with(RawS3::default);
            override_text(&mut s3.song_data, song_data);
            override_text(&mut s3.log_data, log_data);
            override_text(&mut s3.log_jsonpath, log_jsonpath);
            override_text(&mut s3.region, region);
        }

        if let Some(arn) = get("IAM_ROLE", "ARN") {
            self.iam_role.get_or_insert_with(RawIamRole::default).arn = Some(arn);
        }

        let timestamp_unit = get("ETL", "TIMESTAMP_UNIT");
        let time_page_filter = get("ETL", "TIME_PAGE_FILTER");
        if timestamp_unit.is_some() || time_page_filter.is_some() {
            let etl = self.etl.get_or_insert_with(RawEtl::default);
            override_text(&mut etl.timestamp_unit, timestamp_unit);
            override_text(&mut etl.time_page_filter, time_page_filter);
        }
    }
}
