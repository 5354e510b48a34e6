//! User entity
//!
//! Values are validated at construction, so a `User` held anywhere in the
//! crate already satisfies the storage constraints of `user_account`.
//! Persistence is never reached for implicitly: `save`, `get` and `list`
//! take the repository they operate on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;
use crate::db::{RepoError, UserRepository};

/// Maximum length for user names, matching `VARCHAR(30)` in storage
pub const MAX_NAME_LEN: usize = 30;

/// A validated user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NewUser")]
pub struct User {
    id: Uuid,
    name: String,
    fullname: String,
}

/// Unvalidated user payload, as accepted by `POST /users`
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub fullname: String,
    #[serde(default)]
    pub id: Option<Uuid>,
}

impl TryFrom<NewUser> for User {
    type Error = ValidationError;

    fn try_from(new: NewUser) -> Result<Self, Self::Error> {
        let id = new.id.unwrap_or_else(Uuid::new_v4);
        Self::with_id(id, new.name, new.fullname)
    }
}

impl User {
    /// Create a user with a freshly generated id.
    ///
    /// # Example
    /// ```
    /// use userbase_server::models::User;
    ///
    /// let user = User::new("johndoe", "John Doe").unwrap();
    /// assert_eq!(user.name(), "johndoe");
    /// assert!(User::new("x".repeat(31), "Too Long").is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        fullname: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name, fullname)
    }

    /// Create a user with a caller-supplied id.
    ///
    /// # Rules
    /// - `name` is at most 30 characters
    /// - `fullname` is free-form
    pub fn with_id(
        id: Uuid,
        name: impl Into<String>,
        fullname: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }

        Ok(Self {
            id,
            name,
            fullname: fullname.into(),
        })
    }

    /// Rebuild a user from a stored row. A NULL fullname reads back as "".
    pub(crate) fn from_row(id: Uuid, name: String, fullname: Option<String>) -> Self {
        Self {
            id,
            name,
            fullname: fullname.unwrap_or_default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// Persist this user.
    pub async fn save(&self, repo: &dyn UserRepository) -> Result<(), RepoError> {
        repo.add_user(self).await
    }

    /// Look up a user by id. A miss is `Ok(None)`, not an error.
    pub async fn get(repo: &dyn UserRepository, id: Uuid) -> Result<Option<Self>, RepoError> {
        repo.get_user(id).await
    }

    /// All stored users, in storage order.
    pub async fn list(repo: &dyn UserRepository) -> Result<Vec<Self>, RepoError> {
        repo.list_users().await
    }
}
