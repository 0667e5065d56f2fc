use uuid::Uuid;

use crate::domain::{ApiError, Clock, CurrentUser, Session, SessionStore};

// Token verification use case with injected dependencies.
pub struct VerifyTokenUseCase<'a, C, S: ?Sized> {
    pub clock: C,
    pub store: &'a S,
}

impl<C, S> VerifyTokenUseCase<'_, C, S>
where
    C: Clock,
    S: SessionStore + ?Sized,
{
    pub async fn execute(&self, token: &str) -> Result<CurrentUser, ApiError> {
        // Tokens are issued as UUIDs; anything else cannot be one of ours.
        if Uuid::parse_str(token).is_err() {
            return Err(ApiError::malformed_token("Token con formato inválido"));
        }

        let session = self
            .store
            .get(token)
            .await?
            .ok_or_else(|| ApiError::malformed_token("Token inválido"))?;

        if session.expires_at <= self.clock.now_epoch_seconds() {
            // Best-effort cleanup of expired session.
            if let Err(err) = self.store.remove(token).await {
                tracing::warn!(error = %err, "failed to remove expired session");
            }
            return Err(ApiError::expired_token("Token expirado"));
        }

        Ok(map_session(session))
    }
}

fn map_session(session: Session) -> CurrentUser {
    CurrentUser {
        user_id: session.user_id,
        username: session.username,
        role: session.role,
    }
}
