use std::sync::Arc;

use cb_core::error::{AppError, Result};
use cb_core::models::Member;
use cb_core::traits::{CredentialScheme, MemberRepo};

use crate::identity::IdentityLookup;

/// Signup, login, and nickname lookup.
#[derive(Clone)]
pub struct AccountService {
    members: Arc<dyn MemberRepo>,
    credentials: Arc<dyn CredentialScheme>,
    identity: IdentityLookup,
}

impl AccountService {
    pub fn new(
        members: Arc<dyn MemberRepo>,
        credentials: Arc<dyn CredentialScheme>,
        identity: IdentityLookup,
    ) -> Self {
        Self {
            members,
            credentials,
            identity,
        }
    }

    /// The pre-checks give specific messages; the storage UNIQUE constraints
    /// still catch two signups racing for the same id or nickname.
    #[tracing::instrument(skip(self, password))]
    pub async fn signup(&self, user_id: &str, password: &str, nickname: &str) -> Result<()> {
        if self.members.find_member(user_id).await?.is_some() {
            return Err(AppError::Conflict("ID already exists".into()));
        }
        if self.members.nickname_exists(nickname).await? {
            return Err(AppError::Conflict("Nickname already exists".into()));
        }

        let member = Member {
            user_id: user_id.to_string(),
            credential: self.credentials.seal(password)?,
            nickname: nickname.to_string(),
        };
        self.members.insert_member(member).await?;

        tracing::info!("member registered");
        Ok(())
    }

    /// Unknown id and wrong password are indistinguishable to the caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, user_id: &str, password: &str) -> Result<()> {
        match self.members.find_member(user_id).await? {
            Some(member) if self.credentials.verify(password, &member.credential) => Ok(()),
            _ => {
                tracing::warn!("login rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub async fn nickname(&self, user_id: &str) -> Result<String> {
        self.identity.resolve_nickname(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::traits::{MockCredentialScheme, MockMemberRepo};

    fn service(members: MockMemberRepo, credentials: MockCredentialScheme) -> AccountService {
        let members: Arc<dyn MemberRepo> = Arc::new(members);
        AccountService::new(
            Arc::clone(&members),
            Arc::new(credentials),
            IdentityLookup::new(members),
        )
    }

    fn alice() -> Member {
        Member {
            user_id: "alice".into(),
            credential: "sealed:pw".into(),
            nickname: "Alice".into(),
        }
    }

    #[tokio::test]
    async fn test_signup_stores_sealed_credential() {
        let mut members = MockMemberRepo::new();
        members.expect_find_member().returning(|_| Ok(None));
        members.expect_nickname_exists().returning(|_| Ok(false));
        members
            .expect_insert_member()
            .withf(|m| m.user_id == "alice" && m.credential == "sealed:pw" && m.nickname == "Alice")
            .times(1)
            .returning(|_| Ok(()));

        let mut credentials = MockCredentialScheme::new();
        credentials
            .expect_seal()
            .returning(|pw| Ok(format!("sealed:{pw}")));

        service(members, credentials).signup("alice", "pw", "Alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_signup_conflicts() {
        let mut members = MockMemberRepo::new();
        members
            .expect_find_member()
            .returning(|id| Ok((id == "alice").then(alice)));
        members
            .expect_nickname_exists()
            .returning(|nickname| Ok(nickname == "Alice"));
        members.expect_insert_member().never();

        let accounts = service(members, MockCredentialScheme::new());

        let taken_id = accounts.signup("alice", "pw", "Other").await.unwrap_err();
        assert!(matches!(taken_id, AppError::Conflict(ref m) if m == "ID already exists"));

        let taken_nick = accounts.signup("bob", "pw", "Alice").await.unwrap_err();
        assert!(matches!(taken_nick, AppError::Conflict(ref m) if m == "Nickname already exists"));
    }

    #[tokio::test]
    async fn test_login_checks_credential() {
        let mut members = MockMemberRepo::new();
        members
            .expect_find_member()
            .returning(|id| Ok((id == "alice").then(alice)));

        let mut credentials = MockCredentialScheme::new();
        credentials
            .expect_verify()
            .returning(|pw, stored| stored == format!("sealed:{pw}"));

        let accounts = service(members, credentials);
        accounts.login("alice", "pw").await.unwrap();
        assert!(matches!(accounts.login("alice", "nope").await, Err(AppError::InvalidCredentials)));
        assert!(matches!(accounts.login("ghost", "pw").await, Err(AppError::InvalidCredentials)));
    }
}
