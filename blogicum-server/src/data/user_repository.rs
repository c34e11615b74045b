use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::{ProfileForm, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) is_staff: bool,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn update_profile(&self, id: i64, input: ProfileForm) -> Result<Option<User>, DomainError>;
    /// Removes the user with every post and comment they own. Returns the
    /// image paths of the removed posts, or `None` for an unknown user.
    async fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>, DomainError>;
}
