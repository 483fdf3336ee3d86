use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Page;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Used when no database URL is configured and by the integration tests.
/// Email uniqueness is enforced under the write lock, mirroring the
/// `users_email_key` constraint of the Postgres schema.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserError> {
        let users = self.users.read().await;

        let mut sorted: Vec<&User> = users.values().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(sorted
            .into_iter()
            .skip(page.skip as usize)
            .take(page.take as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, UserError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;

    fn user(email: &str, minutes_ago: i64) -> User {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        User {
            id: UserId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$2b$04$placeholder".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("a@example.com", 0)).await.unwrap();

        let by_id = repository.find_by_id(&created.id).await.unwrap();
        assert_eq!(by_id.map(|u| u.id), Some(created.id));

        let by_email = repository
            .find_by_email(&created.email)
            .await
            .unwrap()
            .expect("user should be found by email");
        assert_eq!(by_email.id, created.id);

        assert!(repository
            .find_by_id(&UserId::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("a@example.com", 0)).await.unwrap();

        let result = repository.create(user("a@example.com", 0)).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("old@example.com", 30)).await.unwrap();
        repository.create(user("mid@example.com", 20)).await.unwrap();
        repository.create(user("new@example.com", 10)).await.unwrap();

        let first = repository.list(Page::new(Some(0), Some(2))).await.unwrap();
        let emails: Vec<&str> = first.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["new@example.com", "mid@example.com"]);

        let second = repository.list(Page::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].email.as_str(), "old@example.com");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repository = InMemoryUserRepository::new();
        let mut created = repository.create(user("a@example.com", 0)).await.unwrap();
        let other = repository.create(user("b@example.com", 0)).await.unwrap();

        created.email = other.email.clone();
        let result = repository.update(created.clone()).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));

        created.email = EmailAddress::new("c@example.com".to_string()).unwrap();
        repository.update(created.clone()).await.unwrap();

        repository.delete(&created.id).await.unwrap();
        assert!(matches!(
            repository.delete(&created.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            repository.update(created).await,
            Err(UserError::NotFound(_))
        ));
    }
}
