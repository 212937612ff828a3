use std::sync::Arc;

use crate::{
    models::users::User, repositories::user_repo::UserRepository, sanitize::parse_identifier,
    Error, Result,
};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        let user_id = parse_identifier(user_id).ok_or(Error::NotFound)?;
        let user = self.repo.get_user(user_id).await?;
        let user = user.ok_or(Error::NotFound)?;
        Ok(user)
    }
}
