/// SQL flavour of the target warehouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Amazon Redshift: `IDENTITY` columns, informational foreign keys, `COPY` from S3.
    #[default]
    Redshift,
    /// Plain Postgres, for local runs and integration tests. No bulk copy.
    Postgres,
}

impl Dialect {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "redshift" => Some(Self::Redshift),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redshift => "redshift",
            Self::Postgres => "postgres",
        }
    }

    /// Column definition of the fact table's surrogate key.
    pub fn identity_column(&self) -> &'static str {
        match self {
            Self::Redshift => "BIGINT IDENTITY(0,1) NOT NULL PRIMARY KEY",
            Self::Postgres => "BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
        }
    }

    /// Whether DDL should declare foreign keys.
    ///
    /// Redshift never enforces them. Postgres does, and the fact table is
    /// loaded before its dimensions, so they are left out there.
    pub fn declares_foreign_keys(&self) -> bool {
        matches!(self, Self::Redshift)
    }

    pub fn supports_copy(&self) -> bool {
        matches!(self, Self::Redshift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Dialect::from_name("Redshift"), Some(Dialect::Redshift));
        assert_eq!(Dialect::from_name("postgresql"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_name("mysql"), None);
    }

    #[test]
    fn test_capabilities() {
        assert!(Dialect::Redshift.supports_copy());
        assert!(Dialect::Redshift.declares_foreign_keys());
        assert!(!Dialect::Postgres.supports_copy());
        assert!(!Dialect::Postgres.declares_foreign_keys());
    }
}
