use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Enforces the same uniqueness rules as the PostgreSQL schema. Contents are
/// lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    /// Map of username -> User
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken_by_other(
        users: &HashMap<String, User>,
        email: &EmailAddress,
        username: &Username,
    ) -> bool {
        users
            .values()
            .any(|u| u.email.as_str().eq_ignore_ascii_case(email.as_str()) && u.username != *username)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.username.as_str()) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        if Self::email_taken_by_other(&users, &user.email, &user.username) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }

        users.insert(user.username.as_str().to_string(), user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(username.as_str()).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if !users.contains_key(user.username.as_str()) {
            return Err(UserError::NotFound(user.username.as_str().to_string()));
        }
        if Self::email_taken_by_other(&users, &user.email, &user.username) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }

        users.insert(user.username.as_str().to_string(), user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::PersonName;

    fn user(username: &str, email: &str) -> User {
        User {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            full_name: None,
            first_name: PersonName::new("first_name", "Alice".to_string()).unwrap(),
            last_name: PersonName::new("last_name", "Liddell".to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let alice = user("alice1", "alice@example.com");

        repository.create(alice.clone()).await.unwrap();

        let by_username = repository.find_by_username(&alice.username).await.unwrap();
        assert_eq!(by_username, Some(alice.clone()));

        let by_email = repository.find_by_email(&alice.email).await.unwrap();
        assert_eq!(by_email, Some(alice));
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let repository = InMemoryUserRepository::new();
        let username = Username::new("nobody".to_string()).unwrap();

        assert_eq!(repository.find_by_username(&username).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_never_overwrites() {
        let repository = InMemoryUserRepository::new();
        let original = user("alice1", "alice@example.com");
        repository.create(original.clone()).await.unwrap();

        let result = repository.create(user("alice1", "other@example.com")).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));

        let stored = repository.find_by_username(&original.username).await.unwrap();
        assert_eq!(stored, Some(original));
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let repository = InMemoryUserRepository::new();
        repository
            .create(user("alice1", "alice@example.com"))
            .await
            .unwrap();

        let result = repository.create(user("bob1", "ALICE@example.com")).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update() {
        let repository = InMemoryUserRepository::new();
        let mut alice = user("alice1", "alice@example.com");
        repository.create(alice.clone()).await.unwrap();
        repository
            .create(user("bob1", "bob@example.com"))
            .await
            .unwrap();

        alice.email = EmailAddress::new("bob@example.com".to_string()).unwrap();
        let result = repository.update(alice.clone()).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));

        alice.email = EmailAddress::new("alice@wonderland.example".to_string()).unwrap();
        repository.update(alice.clone()).await.unwrap();
        assert_eq!(
            repository.find_by_username(&alice.username).await.unwrap(),
            Some(alice)
        );
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repository = InMemoryUserRepository::new();

        let result = repository.update(user("nobody", "nobody@example.com")).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let repository = InMemoryUserRepository::new();
        let mut older = user("alice1", "alice@example.com");
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = user("bob1", "bob@example.com");

        repository.create(older.clone()).await.unwrap();
        repository.create(newer.clone()).await.unwrap();

        assert_eq!(repository.list_all().await.unwrap(), vec![newer, older]);
    }
}
