use thiserror::Error;

use super::Dialect;

/// Errors raised while building statements that need optional settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Bulk copy from object storage is not supported by the {} dialect", .0.as_str())]
    CopyUnsupported(Dialect),
    #[error("Setting {section}.{key} is required to build the copy statements")]
    MissingSetting {
        section: &'static str,
        key: &'static str,
    },
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_unsupported_display() {
        assert_eq!(
            CatalogError::CopyUnsupported(Dialect::Postgres).to_string(),
            "Bulk copy from object storage is not supported by the postgres dialect"
        );
    }

    #[test]
    fn test_missing_setting_display() {
        let error = CatalogError::MissingSetting {
            section: "IAM_ROLE",
            key: "ARN",
        };
        assert_eq!(
            error.to_string(),
            "Setting IAM_ROLE.ARN is required to build the copy statements"
        );
    }
}
