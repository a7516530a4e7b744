use std::sync::Arc;

use cb_core::error::{AppError, Result};
use cb_core::traits::MemberRepo;

/// Resolves member ids to display nicknames.
#[derive(Clone)]
pub struct IdentityLookup {
    members: Arc<dyn MemberRepo>,
}

impl IdentityLookup {
    pub fn new(members: Arc<dyn MemberRepo>) -> Self {
        Self { members }
    }

    /// `NotFound` when no member has this id. Read-only.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_nickname(&self, user_id: &str) -> Result<String> {
        self.members
            .find_nickname(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("member", user_id))
    }
}
