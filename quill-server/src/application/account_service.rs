use crate::data::user_repository::{AccountPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{UpdateAccountRequest, User};

pub(crate) struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn current_user(&self, user_id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn update_account(
        &self,
        user_id: i64,
        req: UpdateAccountRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;
        let patch = AccountPatch {
            username: req.username,
            email: req.email,
        };

        self.repo
            .update_account(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }
}
