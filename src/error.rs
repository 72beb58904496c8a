use thiserror::Error;

/// Main error type for index and session operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(
        "word {word:?} contains the end indicator {end_indicator:?}; choose a different end_indicator and rebuild the index"
    )]
    SentinelCollision { word: String, end_indicator: char },

    #[error("word {word:?} inserted at position {position}, before its previous position {last}")]
    PositionOutOfOrder {
        word: String,
        position: u32,
        last: u32,
    },

    #[error("word {word:?} at position {position}, past the last representable position")]
    PositionOutOfRange { word: String, position: u32 },

    #[error("trie cannot hold more than {limit} nodes")]
    TrieFull { limit: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not a saved session")]
    NotASession,

    #[error("Unsupported session version {actual}, expected {expected}")]
    UnsupportedVersion { expected: u32, actual: u32 },

    #[error("Corrupt session: {0}")]
    CorruptSession(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for index and session operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Errors that mean the bytes handed to the session loader were not a valid session
    pub fn is_invalid_session(&self) -> bool {
        matches!(
            self,
            SearchError::NotASession
                | SearchError::UnsupportedVersion { .. }
                | SearchError::CorruptSession(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::SentinelCollision {
            word: "a$b".to_string(),
            end_indicator: '$',
        };
        assert!(err.to_string().contains("\"a$b\""));
        assert!(err.to_string().contains("'$'"));
    }

    #[test]
    fn test_invalid_session_errors() {
        assert!(SearchError::NotASession.is_invalid_session());
        assert!(SearchError::CorruptSession("x".to_string()).is_invalid_session());
        assert!(
            SearchError::UnsupportedVersion {
                expected: 1,
                actual: 7
            }
            .is_invalid_session()
        );
        assert!(!SearchError::InvalidConfig("x".to_string()).is_invalid_session());
    }
}
