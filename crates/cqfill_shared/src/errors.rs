use crate::byte_stream::Location;
use thiserror::Error;

/// Parser error that defines an error (message) on the given position
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}{}", .location.as_ref().map_or_else(String::new, |l| format!(" at {l:?}")))]
pub struct CssError {
    /// Error message
    pub message: String,
    /// Location of the error, if available (during parsing mostly)
    pub location: Option<Location>,
}

impl CssError {
    #[must_use]
    pub fn new(message: &str) -> Self {
        CssError {
            message: message.to_string(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(message: &str, location: Location) -> Self {
        CssError {
            message: message.to_string(),
            location: Some(location),
        }
    }
}

pub type CssResult<T> = Result<T, CssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_location() {
        let plain = CssError::new("unexpected token");
        assert_eq!(plain.to_string(), "unexpected token");

        let located = CssError::with_location("unexpected token", Location::new(3, 7, 42));
        assert_eq!(located.to_string(), "unexpected token at (3:7)");
    }
}
