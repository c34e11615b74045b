use tracing::info;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::identity::Actor;
use crate::domain::user::{ProfileForm, User};

pub(crate) struct ProfileService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> ProfileService<U> {
    pub(crate) fn new(users: U) -> Self {
        Self { users }
    }

    pub(crate) async fn profile(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .map(|creds| creds.user)
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    pub(crate) async fn me(&self, actor: &Actor) -> Result<User, DomainError> {
        self.users
            .get_user(actor.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", actor.user_id))
    }

    /// Only the actor's own profile is ever edited here.
    pub(crate) async fn update_profile(
        &self,
        actor: &Actor,
        form: ProfileForm,
    ) -> Result<User, DomainError> {
        let user = self
            .users
            .update_profile(actor.user_id, form.validate()?)
            .await?
            .ok_or_else(|| DomainError::not_found("user", actor.user_id))?;
        info!(user_id = user.id, "profile updated");
        Ok(user)
    }

    /// Removes an account together with its posts and comments and returns
    /// the image paths those posts referenced.
    pub(crate) async fn delete_user(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<Vec<String>, DomainError> {
        actor.ensure_staff()?;
        let images = self
            .users
            .delete_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))?;
        info!(
            user_id = id,
            deleted_by = actor.user_id,
            images = images.len(),
            "user deleted"
        );
        Ok(images)
    }
}
