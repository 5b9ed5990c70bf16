use uuid::Uuid;

use super::ActionContext;
use crate::backend::{NewDirectoryUser, Query};
use crate::error::{ActionError, ActionResult};
use crate::models::{CreateUserParams, User};

impl ActionContext {
    /// Creates a directory user without a password.
    ///
    /// If the email is already registered, the existing user is returned
    /// instead.
    pub async fn create_user(&self, params: &CreateUserParams) -> ActionResult<User> {
        params.validate().map_err(ActionError::InvalidInput)?;

        let request = NewDirectoryUser {
            user_id: Uuid::new_v4().simple().to_string(),
            email: params.email.clone(),
            phone: params.phone.clone(),
            password: None,
            name: params.name.clone(),
        };

        match self.directory.create_user(&request).await {
            Ok(user) => {
                tracing::info!("Created user {}", user.id);
                Ok(user)
            }
            Err(e) if e.is_conflict() => {
                tracing::info!("Email already registered, looking up existing user");
                self.find_user_by_email(&params.email).await
            }
            Err(e) => {
                tracing::error!("An error occurred while creating a new user: {}", e);
                Err(ActionError::from_backend("user", e))
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> ActionResult<User> {
        let list = self
            .directory
            .list_users(&[Query::equal("email", [email])])
            .await
            .map_err(|e| {
                tracing::error!("An error occurred while looking up user by email: {}", e);
                ActionError::from_backend("user", e)
            })?;

        list.users
            .into_iter()
            .next()
            .ok_or_else(|| ActionError::not_found(format!("user with email {}", email)))
    }

    pub async fn get_user(&self, user_id: &str) -> ActionResult<User> {
        self.directory.get_user(user_id).await.map_err(|e| {
            tracing::error!(
                "An error occurred while retrieving the user details: {}",
                e
            );
            ActionError::from_backend(format!("user {}", user_id), e)
        })
    }
}
