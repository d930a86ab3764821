use std::fmt;

/// Every table the pipeline owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    StagingEvents,
    StagingSongs,
    Songplays,
    Users,
    Songs,
    Artists,
    Time,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::StagingEvents,
        Table::StagingSongs,
        Table::Songplays,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Time,
    ];

    /// Dimension tables, keyed on a natural business key.
    pub const DIMENSIONS: [Table; 4] = [Table::Users, Table::Songs, Table::Artists, Table::Time];

    pub fn name(&self) -> &'static str {
        match self {
            Table::StagingEvents => "staging_events",
            Table::StagingSongs => "staging_songs",
            Table::Songplays => "songplays",
            Table::Users => "users",
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Time => "time",
        }
    }

    /// Quoted identifier for use in SQL text. `time` is a keyword in both dialects.
    pub fn ident(&self) -> String {
        format!("\"{}\"", self.name())
    }

    pub fn primary_key(&self) -> Option<&'static str> {
        match self {
            Table::StagingEvents | Table::StagingSongs => None,
            Table::Songplays => Some("songplay_id"),
            Table::Users => Some("user_id"),
            Table::Songs => Some("song_id"),
            Table::Artists => Some("artist_id"),
            Table::Time => Some("start_time"),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_is_quoted() {
        assert_eq!(Table::Time.ident(), "\"time\"");
        assert_eq!(Table::Songplays.to_string(), "songplays");
    }

    #[test]
    fn test_staging_tables_have_no_key() {
        assert_eq!(Table::StagingEvents.primary_key(), None);
        assert_eq!(Table::StagingSongs.primary_key(), None);
        assert_eq!(Table::Time.primary_key(), Some("start_time"));
    }
}
