//! Bulk-load and transformation statements.

use super::statement::{unquote, Binding, Statement, StatementKind};
use super::{CatalogError, Result, Table};
use crate::config::WarehouseConfig;
use crate::time::TimestampUnit;

const COPY_EVENTS: &str = r#"
COPY "staging_events"
FROM {source}
CREDENTIALS {credentials}
FORMAT AS JSON {json_paths}
REGION {region}
"#;

const COPY_SONGS: &str = r#"
COPY "staging_songs"
FROM {source}
CREDENTIALS {credentials}
FORMAT AS JSON 'auto'
REGION {region}
"#;

const INSERT_USERS: &str = r#"
INSERT INTO "users" (user_id, first_name, last_name, gender, level)
SELECT user_id, first_name, last_name, gender, level
FROM (
    SELECT
        userid AS user_id,
        firstname AS first_name,
        lastname AS last_name,
        gender,
        level,
        ROW_NUMBER() OVER (
            PARTITION BY userid
            ORDER BY ts DESC NULLS LAST, level, firstname, lastname, gender
        ) AS row_num
    FROM "staging_events"
    WHERE page = 'NextSong'
        AND userid IS NOT NULL
) latest
WHERE row_num = 1
"#;

const INSERT_SONGS: &str = r#"
INSERT INTO "songs" (song_id, title, artist_id, year, duration)
SELECT song_id, title, artist_id, year, duration
FROM (
    SELECT
        song_id,
        title,
        artist_id,
        year,
        duration,
        ROW_NUMBER() OVER (
            PARTITION BY song_id
            ORDER BY title, artist_id, year, duration
        ) AS row_num
    FROM "staging_songs"
    WHERE song_id IS NOT NULL
) ranked
WHERE row_num = 1
"#;

const INSERT_ARTISTS: &str = r#"
INSERT INTO "artists" (artist_id, name, location, latitude, longitude)
SELECT artist_id, name, location, latitude, longitude
FROM (
    SELECT
        artist_id,
        artist_name AS name,
        artist_location AS location,
        artist_latitude AS latitude,
        artist_longitude AS longitude,
        ROW_NUMBER() OVER (
            PARTITION BY artist_id
            ORDER BY artist_name, artist_location, artist_latitude, artist_longitude
        ) AS row_num
    FROM "staging_songs"
    WHERE artist_id IS NOT NULL
) ranked
WHERE row_num = 1
"#;

/// Builds the two `COPY` statements, events first.
pub fn copy_statements(config: &WarehouseConfig) -> Result<Vec<Statement>> {
    let dialect = config.cluster.dialect;
    if !dialect.supports_copy() {
        return Err(CatalogError::CopyUnsupported(dialect));
    }

    let s3 = config.s3.as_ref().ok_or(CatalogError::MissingSetting {
        section: "S3",
        key: "SONG_DATA",
    })?;
    let iam_role = config.iam_role.as_ref().ok_or(CatalogError::MissingSetting {
        section: "IAM_ROLE",
        key: "ARN",
    })?;

    let credentials = format!("aws_iam_role={}", unquote(&iam_role.arn));
    let json_paths = s3
        .log_jsonpath
        .as_deref()
        .map(unquote)
        .unwrap_or("auto")
        .to_string();

    let events = Statement::with_bindings(
        Table::StagingEvents,
        StatementKind::Copy,
        COPY_EVENTS.trim(),
        vec![
            Binding::new("source", unquote(&s3.log_data)),
            Binding::secret("credentials", credentials.clone()),
            Binding::new("json_paths", json_paths),
            Binding::new("region", unquote(&s3.region)),
        ],
    );

    let songs = Statement::with_bindings(
        Table::StagingSongs,
        StatementKind::Copy,
        COPY_SONGS.trim(),
        vec![
            Binding::new("source", unquote(&s3.song_data)),
            Binding::secret("credentials", credentials),
            Binding::new("region", unquote(&s3.region)),
        ],
    );

    Ok(vec![events, songs])
}

fn insert_songplays(unit: TimestampUnit) -> String {
    format!(
        r#"
INSERT INTO "songplays" (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT
    {start_time},
    e.userid,
    e.level,
    s.song_id,
    s.artist_id,
    e.sessionid,
    e.location,
    e.useragent
FROM "staging_events" e
INNER JOIN "staging_songs" s
    ON e.song = s.title
    AND e.artist = s.artist_name
WHERE e.page = 'NextSong'
"#,
        start_time = unit.timestamp_expr("e.ts"),
    )
}

fn insert_time(unit: TimestampUnit) -> String {
    format!(
        r#"
INSERT INTO "time" (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT
    start_time,
    EXTRACT(hour FROM start_time),
    EXTRACT(day FROM start_time),
    EXTRACT(week FROM start_time),
    EXTRACT(month FROM start_time),
    EXTRACT(year FROM start_time),
    EXTRACT(dow FROM start_time)
FROM (
    SELECT {start_time} AS start_time
    FROM "staging_events"
    WHERE page = {{time_page}}
        AND ts IS NOT NULL
) events
"#,
        start_time = unit.timestamp_expr("ts"),
    )
}

/// Builds the five `INSERT ... SELECT` statements: fact table first, then
/// users, songs, artists and time.
pub fn insert_statements(config: &WarehouseConfig) -> Vec<Statement> {
    let unit = config.etl.timestamp_unit;

    vec![
        Statement::new(
            Table::Songplays,
            StatementKind::Insert,
            insert_songplays(unit).trim(),
        ),
        Statement::new(Table::Users, StatementKind::Insert, INSERT_USERS.trim()),
        Statement::new(Table::Songs, StatementKind::Insert, INSERT_SONGS.trim()),
        Statement::new(Table::Artists, StatementKind::Insert, INSERT_ARTISTS.trim()),
        Statement::with_bindings(
            Table::Time,
            StatementKind::Insert,
            insert_time(unit).trim(),
            vec![Binding::new(
                "time_page",
                config.etl.time_page_filter.clone(),
            )],
        ),
    ]
}
