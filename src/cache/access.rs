//! Caller context for a visibility check.

use crate::types::Identity;

/// Who is asking, and about which repository.
///
/// Implemented by the request layer. The cache uses both values only as
/// parts of the cache key.
pub trait Access {
    /// Identity of the caller, or [`Identity::Anonymous`].
    fn user_key(&self) -> Identity;

    /// Name of the repository being browsed.
    fn repository_name(&self) -> &str;
}

/// Plain [`Access`] value for callers that already know both fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAccess {
    /// Caller identity.
    pub user: Identity,
    /// Repository name.
    pub repository: String,
}

impl RequestAccess {
    /// Create an access context.
    pub fn new(user: Identity, repository: impl Into<String>) -> Self {
        Self {
            user,
            repository: repository.into(),
        }
    }

    /// Access context for an unauthenticated caller.
    pub fn anonymous(repository: impl Into<String>) -> Self {
        Self::new(Identity::Anonymous, repository)
    }
}

impl Access for RequestAccess {
    fn user_key(&self) -> Identity {
        self.user.clone()
    }

    fn repository_name(&self) -> &str {
        &self.repository
    }
}
