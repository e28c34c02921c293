//! Who is asking.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque cache partition token for the caller of a visibility check.
///
/// The cache compares and hashes it and never looks inside. Ordering only
/// exists to keep diagnostic snapshots stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Identity {
    /// Unauthenticated or public caller.
    #[default]
    Anonymous,
    /// An authenticated user, keyed however the caller likes.
    User(String),
}

impl Identity {
    /// Shorthand for [`Identity::User`].
    pub fn user(key: impl Into<String>) -> Self {
        Identity::User(key.into())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => f.write_str("<anonymous>"),
            Identity::User(key) => f.write_str(key),
        }
    }
}
