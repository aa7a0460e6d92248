//! The acting user.
//!
//! Storage operations that read or write user-owned rows take a `&Session`
//! explicitly instead of consulting ambient state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VoyageError};

const MAX_DISPLAY_NAME_CHARS: usize = 80;

/// Identity of the user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }

    /// Attach a display name, trimming surrounding whitespace.
    ///
    /// Blank names are treated as absent.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.chars().count() > MAX_DISPLAY_NAME_CHARS {
            return Err(VoyageError::Validation(format!(
                "Display name too long (max {} characters)",
                MAX_DISPLAY_NAME_CHARS
            )));
        }
        self.display_name = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        Ok(self)
    }

    /// Whether this session owns a row authored by `user_id`.
    pub fn owns(&self, user_id: &Uuid) -> bool {
        &self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trimmed() {
        let session = Session::new(Uuid::new_v4())
            .with_display_name("  Skipper  ")
            .unwrap();
        assert_eq!(session.display_name.as_deref(), Some("Skipper"));
    }

    #[test]
    fn test_blank_display_name_is_none() {
        let session = Session::new(Uuid::new_v4()).with_display_name("   ").unwrap();
        assert!(session.display_name.is_none());
    }

    #[test]
    fn test_display_name_too_long() {
        let result = Session::new(Uuid::new_v4()).with_display_name("x".repeat(81));
        assert!(result.is_err());
    }

    #[test]
    fn test_owns() {
        let id = Uuid::new_v4();
        let session = Session::new(id);
        assert!(session.owns(&id));
        assert!(!session.owns(&Uuid::new_v4()));
    }
}
