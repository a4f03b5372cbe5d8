//! User management: profile reads and updates, listing, admin deletion

use std::sync::Arc;

use database::bson::{Document, doc};
use database::{
    BaseService, Operation, PaginatedResult, PaginationParams, Repository, ServiceError,
    record::parse_object_id,
};
use tracing::instrument;

use crate::error::{USER_NOT_FOUND, UserError, UserResult};
use crate::models::{UpdateProfile, User, UserResponse, normalize_email};

/// Service layer for user business logic
pub struct UserService<R> {
    base: BaseService<User, UserResponse, R>,
}

impl<R> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<R: Repository<User>> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            base: BaseService::new(repository).with_not_found_message(USER_NOT_FOUND),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> UserResult<UserResponse> {
        Ok(self.base.get_by_id(user_id).await?)
    }

    /// Active users, one page at a time
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        params: PaginationParams,
    ) -> UserResult<PaginatedResult<UserResponse>> {
        Ok(self.base.get_all(params, doc! { "isActive": true }).await?)
    }

    /// Update name and/or email of the calling user
    ///
    /// An email held by any other user is rejected with [`UserError::EmailInUse`].
    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfile,
    ) -> UserResult<UserResponse> {
        let mut changes = Document::new();

        if let Some(name) = input.name {
            changes.insert("name", name.trim());
        }

        if let Some(email) = input.email {
            let email = normalize_email(&email);
            let caller = parse_object_id(user_id, Operation::Update)?;
            let taken = self
                .base
                .repository()
                .find_one(doc! { "email": email.as_str(), "_id": { "$ne": caller } })
                .await?;
            if taken.is_some() {
                return Err(UserError::EmailInUse);
            }
            changes.insert("email", email);
        }

        self.base
            .update(user_id, changes)
            .await
            .map_err(|e| match e {
                ServiceError::Repository(e) if e.is_conflict() => UserError::EmailInUse,
                e => e.into(),
            })
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> UserResult<()> {
        self.base.delete(user_id).await?;
        Ok(())
    }
}
