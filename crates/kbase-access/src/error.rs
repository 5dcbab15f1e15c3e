//! Error types for access control and accounts

use crate::action::Action;
use kbase_tree::TopicPath;

/// Errors from the access resolver and the user directory
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Caller attempted an action it holds no grant for
    #[error("user '{user}' may not {action} '{path}'")]
    Unauthorized {
        user: String,
        path: TopicPath,
        action: Action,
    },

    /// No account with this name
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Account name already taken
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    /// Blank or padded account name
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    /// Built-in account that cannot be deleted
    #[error("account '{0}' is protected")]
    ProtectedAccount(String),

    /// Hashing backend failure
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl AccessError {
    /// Create unauthorized error
    pub fn unauthorized(user: impl Into<String>, path: &TopicPath, action: Action) -> Self {
        Self::Unauthorized {
            user: user.into(),
            path: path.clone(),
            action,
        }
    }
}

/// Result type alias for access operations
pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_display() {
        let err = AccessError::unauthorized("ravi", &TopicPath::from(["Billing", "UPI"]), Action::Edit);
        assert_eq!(err.to_string(), "user 'ravi' may not edit 'Billing / UPI'");
    }
}
