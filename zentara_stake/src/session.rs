//! User session management
//!
//! The signed-in user lives in an explicit [`SessionManager`] rather than
//! global state. Where it is persisted is decided by the [`SessionStore`]
//! backend: memory for tests, a JSON file for the running app.
//!
//! Authentication is a mock. Any email can sign up, and no password is
//! stored or checked apart from the built-in demo account.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::SessionError;

type Result<T> = std::result::Result<T, SessionError>;

const DEMO_EMAIL: &str = "bash@gmail.com";
const DEMO_PASSWORD: &str = "123456";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub kyc_status: KycStatus,
}

impl User {
    fn demo() -> Self {
        Self {
            id: "user_bash".to_string(),
            email: DEMO_EMAIL.to_string(),
            display_name: Some("Bash User".to_string()),
            photo_url: None,
            kyc_status: KycStatus::Pending,
        }
    }

    fn from_email(email: &str) -> Self {
        Self {
            id: format!("user_{}", Utc::now().timestamp_millis()),
            email: email.to_string(),
            display_name: email.split('@').next().map(str::to_string),
            photo_url: None,
            kyc_status: KycStatus::Pending,
        }
    }
}

/// Persistence backend for the signed-in user
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<User>>;

    async fn save(&self, user: &User) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// In-memory session store (for testing)
#[derive(Default)]
pub struct InMemorySessionStore {
    user: RwLock<Option<User>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<User>> {
        Ok(self.user.read().await.clone())
    }

    async fn save(&self, user: &User) -> Result<()> {
        *self.user.write().await = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.user.write().await = None;
        Ok(())
    }
}

/// Keeps the user as a JSON document on disk
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<User>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, user: &User) -> Result<()> {
        let json = serde_json::to_vec_pretty(user)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

pub struct SessionManager<S: SessionStore> {
    store: S,
    current: RwLock<Option<User>>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Pick up a user persisted by a previous run
    pub async fn restore(&self) -> Result<Option<User>> {
        let user = self.store.load().await?;
        if let Some(user) = &user {
            debug!(user_id = %user.id, "Session restored");
        }
        *self.current.write().await = user.clone();
        Ok(user)
    }

    pub async fn sign_up_with_email(&self, email: &str, _password: &str) -> Result<User> {
        let user = if email == DEMO_EMAIL {
            User::demo()
        } else {
            User::from_email(email)
        };
        self.establish(user).await
    }

    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<User> {
        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            return self.establish(User::demo()).await;
        }

        match self.store.load().await? {
            Some(saved) if email != DEMO_EMAIL && saved.email == email => {
                self.establish(saved).await
            }
            _ => {
                warn!(email = %email, "Sign in rejected");
                Err(SessionError::InvalidCredentials)
            }
        }
    }

    pub async fn sign_in_with_google(&self) -> Result<User> {
        let user = User {
            id: format!("user_google_{}", Utc::now().timestamp_millis()),
            email: "user@gmail.com".to_string(),
            display_name: Some("Google User".to_string()),
            photo_url: Some("https://via.placeholder.com/40".to_string()),
            kyc_status: KycStatus::Pending,
        };
        self.establish(user).await
    }

    pub async fn sign_out(&self) -> Result<()> {
        let previous = self.current.write().await.take();
        self.store.clear().await?;
        if let Some(user) = previous {
            info!(user_id = %user.id, "Signed out");
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn require_user(&self) -> Result<User> {
        self.current_user().await.ok_or(SessionError::NotSignedIn)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn establish(&self, user: User) -> Result<User> {
        self.store.save(&user).await?;
        *self.current.write().await = Some(user.clone());
        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_account() {
        let session = SessionManager::new(InMemorySessionStore::new());

        let user = session.sign_in_with_email(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(user.id, "user_bash");
        assert!(session.is_authenticated().await);

        assert!(matches!(
            session.sign_in_with_email(DEMO_EMAIL, "654321").await,
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let session = SessionManager::new(InMemorySessionStore::new());

        let user = session.sign_up_with_email("alice@example.com", "pw").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("alice"));
        assert_eq!(user.kyc_status, KycStatus::Pending);

        session.sign_out().await.unwrap();
        assert!(!session.is_authenticated().await);

        // sign out clears the stored user as well
        assert!(session.sign_in_with_email("alice@example.com", "pw").await.is_err());
    }

    #[tokio::test]
    async fn test_sign_in_matches_stored_user() {
        let store = InMemorySessionStore::new();
        store.save(&User::from_email("carol@example.com")).await.unwrap();
        let session = SessionManager::new(store);

        let user = session.sign_in_with_email("carol@example.com", "anything").await.unwrap();
        assert_eq!(user.email, "carol@example.com");

        assert!(matches!(
            session.sign_in_with_email("dave@example.com", "anything").await,
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_google_sign_in() {
        let session = SessionManager::new(InMemorySessionStore::new());
        let user = session.sign_in_with_google().await.unwrap();
        assert!(user.id.starts_with("user_google_"));
        assert_eq!(session.require_user().await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_require_user_when_signed_out() {
        let session = SessionManager::new(InMemorySessionStore::new());
        assert!(matches!(
            session.require_user().await,
            Err(SessionError::NotSignedIn)
        ));
    }
}
