//! Property lookup errors.

use thiserror::Error;

/// Result type for property lookups.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Errors from property data lookups.
///
/// A missing entry is an error, never a silent zero. Zero is a legitimate
/// property value (hydrogen has a zero CO2 factor) and must stay
/// distinguishable from "no data".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("No property data for '{substance}'")]
    NotFound { substance: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_substance() {
        let err = PropertyError::NotFound {
            substance: "unobtainium".into(),
        };
        assert!(err.to_string().contains("unobtainium"));
    }
}
