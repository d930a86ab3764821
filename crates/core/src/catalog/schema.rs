//! Table definitions (DDL) for the staging area and the star schema.
//!
//! Pure data: every function returns SQL text for a given dialect.

use super::{Dialect, Table};

const STAGING_EVENTS_COLUMNS: &str = r#"
    "artist" VARCHAR(256),
    "auth" VARCHAR(32),
    "firstname" VARCHAR(64),
    "gender" VARCHAR(8),
    "iteminsession" INT,
    "lastname" VARCHAR(64),
    "length" DECIMAL(15,5),
    "level" VARCHAR(16),
    "location" VARCHAR(256),
    "method" VARCHAR(16),
    "page" VARCHAR(32),
    "registration" BIGINT,
    "sessionid" INT,
    "song" VARCHAR(256),
    "status" INT,
    "ts" BIGINT,
    "useragent" VARCHAR(512),
    "userid" INT
"#;

const STAGING_SONGS_COLUMNS: &str = r#"
    "num_songs" INT,
    "artist_id" VARCHAR(32),
    "artist_latitude" DECIMAL(15,5),
    "artist_longitude" DECIMAL(15,5),
    "artist_location" VARCHAR(256),
    "artist_name" VARCHAR(256),
    "song_id" VARCHAR(32),
    "title" VARCHAR(256),
    "duration" DECIMAL(15,5),
    "year" INT
"#;

const USERS_COLUMNS: &str = r#"
    "user_id" INT NOT NULL PRIMARY KEY,
    "first_name" VARCHAR(64),
    "last_name" VARCHAR(64),
    "gender" VARCHAR(8),
    "level" VARCHAR(16)
"#;

const ARTISTS_COLUMNS: &str = r#"
    "artist_id" VARCHAR(32) NOT NULL PRIMARY KEY,
    "name" VARCHAR(256),
    "location" VARCHAR(256),
    "latitude" DECIMAL(15,5),
    "longitude" DECIMAL(15,5)
"#;

const TIME_COLUMNS: &str = r#"
    "start_time" TIMESTAMP NOT NULL PRIMARY KEY,
    "hour" INT,
    "day" INT,
    "week" INT,
    "month" INT,
    "year" INT,
    "weekday" INT
"#;

/// `DROP TABLE IF EXISTS` for `table`.
pub fn drop_table_sql(table: Table) -> String {
    format!("DROP TABLE IF EXISTS {}", table.ident())
}

/// `CREATE TABLE IF NOT EXISTS` for `table` in `dialect`.
pub fn create_table_sql(table: Table, dialect: Dialect) -> String {
    let columns = match table {
        Table::StagingEvents => STAGING_EVENTS_COLUMNS.to_string(),
        Table::StagingSongs => STAGING_SONGS_COLUMNS.to_string(),
        Table::Users => USERS_COLUMNS.to_string(),
        Table::Artists => ARTISTS_COLUMNS.to_string(),
        Table::Time => TIME_COLUMNS.to_string(),
        Table::Songs => songs_columns(dialect),
        Table::Songplays => songplays_columns(dialect),
    };
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.ident(),
        columns.trim_end()
    )
}

fn references(dialect: Dialect, table: Table, column: &str) -> String {
    if dialect.declares_foreign_keys() {
        format!(" REFERENCES {}({column})", table.ident())
    } else {
        String::new()
    }
}

fn songs_columns(dialect: Dialect) -> String {
    format!(
        r#"
    "song_id" VARCHAR(32) NOT NULL PRIMARY KEY,
    "title" VARCHAR(256),
    "artist_id" VARCHAR(32){artists},
    "year" INT,
    "duration" DECIMAL(15,5)
"#,
        artists = references(dialect, Table::Artists, "artist_id"),
    )
}

fn songplays_columns(dialect: Dialect) -> String {
    format!(
        r#"
    "songplay_id" {identity},
    "start_time" TIMESTAMP{time},
    "user_id" INT{users},
    "level" VARCHAR(16),
    "song_id" VARCHAR(32){songs},
    "artist_id" VARCHAR(32){artists},
    "session_id" BIGINT,
    "location" VARCHAR(256),
    "user_agent" VARCHAR(512)
"#,
        identity = dialect.identity_column(),
        time = references(dialect, Table::Time, "start_time"),
        users = references(dialect, Table::Users, "user_id"),
        songs = references(dialect, Table::Songs, "song_id"),
        artists = references(dialect, Table::Artists, "artist_id"),
    )
}
