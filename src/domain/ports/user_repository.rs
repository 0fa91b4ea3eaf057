use crate::domain::entities::{Role, User, UserStatus};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> DomainResult<()>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn list_users(&self, limit: i64, offset: i64) -> DomainResult<(Vec<User>, i64)>;
    async fn update_user_access(
        &self,
        id: &str,
        role: Role,
        status: UserStatus,
        updated_at: &str,
    ) -> DomainResult<()>;
}
