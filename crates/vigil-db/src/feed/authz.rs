//! Feed read authorization.

use vigil_core::entities::Investigation;

/// Decides whether a user may read an investigation's feed.
pub trait FeedAuthorizer: Send + Sync {
    fn can_read(&self, user_id: &str, investigation: &Investigation) -> bool;
}

/// The owner can read; so can any configured admin.
#[derive(Debug, Clone, Default)]
pub struct OwnerOrAdmin {
    admins: Vec<String>,
}

impl OwnerOrAdmin {
    #[must_use]
    pub const fn new(admins: Vec<String>) -> Self {
        Self { admins }
    }
}

impl FeedAuthorizer for OwnerOrAdmin {
    fn can_read(&self, user_id: &str, investigation: &Investigation) -> bool {
        investigation.owner_user_id == user_id || self.admins.iter().any(|a| a == user_id)
    }
}
