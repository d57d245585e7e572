use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;

use super::dto::RegisterRequest;
use super::model::User;
use super::password::PasswordScheme;
use super::store::UserStore;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    Duplicate(String),
    /// Unknown identifier and wrong password collapse into this one variant
    /// so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// User identity manager: registration with uniqueness checks, login with
/// the overloaded username-or-email identifier, lookup by id.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    passwords: Arc<dyn PasswordScheme>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordScheme>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, passwords, clock }
    }

    /// Registers a new user. Username is checked before email; either
    /// collision fails the whole registration. Uniqueness is a lookup here,
    /// not a store constraint.
    pub async fn register(&self, candidate: RegisterRequest) -> Result<User, IdentityError> {
        if self
            .store
            .find_by_username(&candidate.username)
            .await?
            .is_some()
        {
            warn!(username = %candidate.username, "duplicate username");
            return Err(IdentityError::Duplicate(format!(
                "User with username {} already exists",
                candidate.username
            )));
        }
        if self.store.find_by_email(&candidate.email).await?.is_some() {
            warn!(email = %candidate.email, "duplicate email");
            return Err(IdentityError::Duplicate(format!(
                "User with email {} already exists",
                candidate.email
            )));
        }

        let password_hash = self.passwords.hash(&candidate.password)?;
        let user = User {
            id: None,
            username: candidate.username,
            email: candidate.email,
            password_hash,
            profile: candidate.profile,
            created_at: self.clock.now_millis(),
        };
        let user = self.store.save(user).await?;
        info!(id = ?user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticates with a username-or-email identifier: username lookup
    /// first, then the same value as an email.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, IdentityError> {
        let identifier = identifier.trim();
        let user = match self.store.find_by_username(identifier).await? {
            Some(user) => Some(user),
            // Emails are stored trimmed and lowercased, so the alternate-key
            // leg normalizes the identifier the same way.
            None => self.store.find_by_email(&identifier.to_lowercase()).await?,
        };

        let Some(user) = user else {
            return Err(IdentityError::InvalidCredentials);
        };
        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }
        info!(id = ?user.id, username = %user.username, "user logged in");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, IdentityError> {
        Ok(self.store.find_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::password::FoldScheme;
    use super::super::store::MemUserStore;
    use super::*;
    use crate::clock::ManualClock;

    struct Harness {
        service: UserService,
        store: Arc<MemUserStore>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemUserStore::default());
        let service = UserService::new(
            store.clone(),
            Arc::new(FoldScheme),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        );
        Harness { service, store }
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "hunter2".into(),
            profile: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn register_hashes_password_and_assigns_id() {
        let h = harness();
        let user = h.service.register(alice()).await.unwrap();

        assert!(user.id.is_some());
        assert_ne!(user.password_hash, "hunter2");
        assert_eq!(user.created_at, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_and_nothing_is_written() {
        let h = harness();
        h.service.register(alice()).await.unwrap();

        let mut second = alice();
        second.email = "other@example.com".into();
        let err = h.service.register(second).await.unwrap_err();

        assert!(matches!(err, IdentityError::Duplicate(_)));
        assert!(err.to_string().contains("username alice"));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_after_username_passes() {
        let h = harness();
        h.service.register(alice()).await.unwrap();

        let mut second = alice();
        second.username = "bob".into();
        let err = h.service.register(second).await.unwrap_err();

        assert!(matches!(err, IdentityError::Duplicate(_)));
        assert!(err.to_string().contains("email alice@example.com"));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let h = harness();
        h.service.register(alice()).await.unwrap();

        let by_name = h.service.login("alice", "hunter2").await.unwrap();
        assert_eq!(by_name.username, "alice");

        let by_email = h.service.login("alice@example.com", "hunter2").await.unwrap();
        assert_eq!(by_email.username, "alice");
    }

    #[tokio::test]
    async fn login_email_leg_ignores_case_and_whitespace() {
        let h = harness();
        h.service.register(alice()).await.unwrap();

        // Stored email is lowercase; the identifier the user types may not be.
        let user = h
            .service
            .login(" Alice@Example.COM ", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn login_collapses_failure_modes() {
        let h = harness();
        h.service.register(alice()).await.unwrap();

        // Wrong password, by either identifier form.
        let err = h.service.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
        let err = h
            .service
            .login("alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));

        // Unknown identifier is indistinguishable from a wrong password.
        let err = h.service.login("nobody", "hunter2").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let h = harness();
        assert!(h.service.get(Uuid::new_v4()).await.unwrap().is_none());

        let id = h.service.register(alice()).await.unwrap().id.unwrap();
        assert_eq!(h.service.get(id).await.unwrap().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn profile_fields_pass_through_registration() {
        let h = harness();
        let mut req = alice();
        req.profile = serde_json::json!({"walletAddress": "0xabc", "displayName": "Alice"});
        let user = h.service.register(req).await.unwrap();

        assert_eq!(user.profile["walletAddress"], "0xabc");
        assert_eq!(user.profile["displayName"], "Alice");
    }
}
