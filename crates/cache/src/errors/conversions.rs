//! Error conversion utilities

use super::types::{CacheError, RecoveryHint};

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            origin: "inline JSON".to_string(),
            source: Box::new(error),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check JSON format and field types".to_string(),
            },
        }
    }
}
