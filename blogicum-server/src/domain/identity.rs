use super::error::DomainError;

/// The caller on whose behalf a service operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) user_id: i64,
    pub(crate) is_staff: bool,
}

impl Actor {
    pub(crate) fn new(user_id: i64, is_staff: bool) -> Self {
        Self { user_id, is_staff }
    }

    /// Owners and staff may change or remove a resource.
    pub(crate) fn can_manage(&self, owner_id: i64) -> bool {
        self.is_staff || self.user_id == owner_id
    }

    pub(crate) fn is_user(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub(crate) fn ensure_can_manage(&self, owner_id: i64) -> Result<(), DomainError> {
        if self.can_manage(owner_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    pub(crate) fn ensure_staff(&self) -> Result<(), DomainError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}
