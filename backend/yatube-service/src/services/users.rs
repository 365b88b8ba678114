use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::User;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(custom(function = "crate::validators::validate_username"))]
    pub username: String,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn ContentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn signup(&self, form: SignupForm) -> Result<User> {
        form.validate()?;
        let user = self.store.create_user(form.username.trim()).await?;
        info!(user_id = user.id, username = %user.username, "user signed up");
        Ok(user)
    }

    /// Removes the user with everything they authored, their follows and
    /// their likes.
    pub async fn delete(&self, username: &str) -> Result<()> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        self.store.delete_user(user.id).await?;
        info!(user_id = user.id, username, "user deleted");
        Ok(())
    }
}
