use crate::domain::entities::Session;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> DomainResult<()>;
    async fn get_session_by_token(&self, token: &str) -> DomainResult<Option<Session>>;
    async fn delete_session(&self, token: &str) -> DomainResult<()>;
    async fn delete_user_sessions(&self, user_id: &str) -> DomainResult<u64>;
}
