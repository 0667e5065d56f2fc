use uuid::Uuid;

use crate::domain::{ApiError, Clock, Session, SessionStore, UserStore};
use crate::interface_adapters::protocol::LoginRequest;
use crate::use_cases::users::verify_password;

// Session granted by a successful login.
pub struct LoginGrant {
    pub token: String,
    pub expires_at: u64,
    pub username: String,
    pub role: &'static str,
}

pub enum LoginOutcome {
    Granted(LoginGrant),
    // Unknown user or wrong password; callers answer 401 without saying which.
    Rejected,
}

// Login use case with injected dependencies.
pub struct LoginUseCase<'a, C, U: ?Sized, S: ?Sized> {
    pub clock: C,
    pub users: &'a U,
    pub sessions: &'a S,
    pub ttl_seconds: u64,
}

impl<C, U, S> LoginUseCase<'_, C, U, S>
where
    C: Clock,
    U: UserStore + ?Sized,
    S: SessionStore + ?Sized,
{
    pub async fn execute(&self, payload: LoginRequest) -> Result<LoginOutcome, ApiError> {
        let username = payload.username.trim();
        if username.is_empty() || payload.password.is_empty() {
            return Ok(LoginOutcome::Rejected);
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(LoginOutcome::Rejected);
        };
        if !verify_password(&user, &payload.password) {
            tracing::warn!(username = %user.username, "login rejected: wrong password");
            return Ok(LoginOutcome::Rejected);
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = self.clock.now_epoch_seconds().saturating_add(self.ttl_seconds);
        let session = Session {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            expires_at,
        };
        self.sessions.insert(token.clone(), session).await?;

        Ok(LoginOutcome::Granted(LoginGrant {
            token,
            expires_at,
            username: user.username,
            role: user.role.as_str(),
        }))
    }
}

// Revokes a session token. Unknown tokens are not an error.
pub struct LogoutUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> LogoutUseCase<'_, S>
where
    S: SessionStore + ?Sized,
{
    pub async fn execute(&self, token: &str) -> Result<bool, ApiError> {
        Ok(self.store.remove(token).await?)
    }
}

// Drops sessions whose tokens were never presented again after expiry.
pub struct PruneSessionsUseCase<'a, C, S: ?Sized> {
    pub clock: C,
    pub store: &'a S,
}

impl<C, S> PruneSessionsUseCase<'_, C, S>
where
    C: Clock,
    S: SessionStore + ?Sized,
{
    pub async fn execute(&self) -> Result<usize, ApiError> {
        let removed = self
            .store
            .remove_expired(self.clock.now_epoch_seconds())
            .await?;
        if removed > 0 {
            tracing::debug!(removed, "expired sessions pruned");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::protocol::CreateUserRequest;
    use crate::interface_adapters::stores::InMemoryUserStore;
    use crate::use_cases::test_support::{
        seller_session, FailureFlags, FixedClock, RecordingSessionStore,
    };
    use crate::use_cases::users::CreateUserUseCase;

    async fn users_with_seller() -> InMemoryUserStore {
        let users = InMemoryUserStore::new();
        CreateUserUseCase { store: &users }
            .execute(CreateUserRequest {
                username: "caja1".to_string(),
                email: "caja1@ferreteria.com".to_string(),
                password: "clave-segura".to_string(),
                role: None,
            })
            .await
            .expect("expected user creation");
        users
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn when_credentials_match_then_session_is_stored_and_token_returned() {
        let users = users_with_seller().await;
        let sessions = RecordingSessionStore::new();
        let use_case = LoginUseCase {
            clock: FixedClock(1_700_000_000),
            users: &users,
            sessions: &sessions,
            ttl_seconds: 3600,
        };

        let outcome = use_case
            .execute(login("caja1", "clave-segura"))
            .await
            .expect("expected login to succeed");

        let LoginOutcome::Granted(grant) = outcome else {
            panic!("expected login to be granted");
        };
        assert_eq!(grant.expires_at, 1_700_003_600);
        assert_eq!(grant.role, "seller");
        let saved = sessions
            .get_test_session(&grant.token)
            .expect("expected session to be stored");
        assert_eq!(saved.username, "caja1");
        assert_eq!(saved.expires_at, 1_700_003_600);
    }

    #[tokio::test]
    async fn when_ttl_is_huge_then_expiry_saturates_instead_of_overflowing() {
        let users = users_with_seller().await;
        let sessions = RecordingSessionStore::new();
        let use_case = LoginUseCase {
            clock: FixedClock(1_700_000_000),
            users: &users,
            sessions: &sessions,
            ttl_seconds: u64::MAX,
        };

        let outcome = use_case
            .execute(login("caja1", "clave-segura"))
            .await
            .expect("expected login to succeed");

        let LoginOutcome::Granted(grant) = outcome else {
            panic!("expected login to be granted");
        };
        assert_eq!(grant.expires_at, u64::MAX);
    }

    #[tokio::test]
    async fn when_password_is_wrong_then_login_is_rejected() {
        let users = users_with_seller().await;
        let sessions = RecordingSessionStore::new();
        let use_case = LoginUseCase {
            clock: FixedClock(1_700_000_000),
            users: &users,
            sessions: &sessions,
            ttl_seconds: 3600,
        };

        let outcome = use_case
            .execute(login("caja1", "incorrecta"))
            .await
            .expect("expected login to complete");

        assert!(matches!(outcome, LoginOutcome::Rejected));
    }

    #[tokio::test]
    async fn when_user_is_unknown_then_login_is_rejected() {
        let users = InMemoryUserStore::new();
        let sessions = RecordingSessionStore::new();
        let use_case = LoginUseCase {
            clock: FixedClock(1_700_000_000),
            users: &users,
            sessions: &sessions,
            ttl_seconds: 3600,
        };

        let outcome = use_case
            .execute(login("nadie", "clave-segura"))
            .await
            .expect("expected login to complete");

        assert!(matches!(outcome, LoginOutcome::Rejected));
    }

    #[tokio::test]
    async fn when_session_insert_fails_then_returns_persistence_error() {
        let users = users_with_seller().await;
        let sessions = RecordingSessionStore::new().with_failures(FailureFlags {
            insert: true,
            ..Default::default()
        });
        let use_case = LoginUseCase {
            clock: FixedClock(1_700_000_000),
            users: &users,
            sessions: &sessions,
            ttl_seconds: 3600,
        };

        let result = use_case.execute(login("caja1", "clave-segura")).await;

        assert!(matches!(result, Err(ApiError::Persistence { .. })));
    }

    #[tokio::test]
    async fn when_logout_token_exists_then_it_is_revoked() {
        let sessions = RecordingSessionStore::new();
        sessions.insert_test_session("token-1", seller_session(1_700_000_100));
        let use_case = LogoutUseCase { store: &sessions };

        let revoked = use_case.execute("token-1").await.expect("expected logout");
        let again = use_case.execute("token-1").await.expect("expected logout");

        assert!(revoked);
        assert!(!again);
        assert!(sessions.get_test_session("token-1").is_none());
    }

    #[tokio::test]
    async fn when_sessions_are_pruned_then_only_expired_ones_are_dropped() {
        let sessions = RecordingSessionStore::new();
        sessions.insert_test_session("olvidada", seller_session(1_699_999_000));
        sessions.insert_test_session("justo", seller_session(1_700_000_000));
        sessions.insert_test_session("activa", seller_session(1_700_003_600));
        let use_case = PruneSessionsUseCase {
            clock: FixedClock(1_700_000_000),
            store: &sessions,
        };

        let removed = use_case.execute().await.expect("expected prune to succeed");

        assert_eq!(removed, 2);
        assert!(sessions.get_test_session("olvidada").is_none());
        assert!(sessions.get_test_session("justo").is_none());
        assert!(sessions.get_test_session("activa").is_some());
    }

    #[tokio::test]
    async fn when_prune_fails_then_returns_persistence_error() {
        let sessions = RecordingSessionStore::new().with_failures(FailureFlags {
            remove: true,
            ..Default::default()
        });
        let use_case = PruneSessionsUseCase {
            clock: FixedClock(1_700_000_000),
            store: &sessions,
        };

        let result = use_case.execute().await;

        assert!(matches!(result, Err(ApiError::Persistence { .. })));
    }
}
