/*
 * Responsibility
 * - users の lookup (email → UserRecord) を collaborator として定義
 * - 永続化はこの crate の範囲外なので、in-memory 実装だけを持つ
 * - email は常に normalize (trim + lowercase) 済みの値で扱う
 */
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::identity::{Identity, Role, normalize_email};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_digest: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(&self.email, self.role)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_digest: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

/// Lookup-by-email collaborator used during authentication.
///
/// This may block on I/O; timeouts are the implementation's business.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, new_user: NewUser) -> Result<UserRecord, RepoError> {
        let email = normalize_email(&new_user.email);
        let mut users = self.users.write().await;
        if users.contains_key(&email) {
            return Err(RepoError::Conflict);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_digest: new_user.password_digest,
            role: new_user.role,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
        };
        users.insert(email, record.clone());

        Ok(record)
    }
}

#[async_trait]
impl UserLookup for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let email = normalize_email(email);
        Ok(self.users.read().await.get(&email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_digest: "digest".to_string(),
            role: Role::User,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_normalizes_and_rejects_duplicates() {
        let repo = InMemoryUserRepo::new();
        let rec = repo.insert(new_user(" Ada@Example.com ")).await.unwrap();
        assert_eq!(rec.email, "ada@example.com");

        let dup = repo.insert(new_user("ada@example.com")).await;
        assert!(matches!(dup, Err(RepoError::Conflict)));

        let kept = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(kept.id, rec.id);
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let repo = InMemoryUserRepo::new();
        repo.insert(new_user("ada@example.com")).await.unwrap();

        let found = repo.find_by_email("ADA@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.first_name), Some("Ada".to_string()));
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
