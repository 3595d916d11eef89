//! Authentication collaborator and the account service built on it

mod account;
mod memory;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::model::Session;

pub use account::AccountService;
pub use memory::InMemoryAuth;

/// Email/password identity provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in
    async fn create_account(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self);

    fn current_session(&self) -> Option<Session>;

    /// Delete the signed-in account
    async fn delete_current(&self) -> Result<()>;

    /// Check the current password of the signed-in account
    async fn reauthenticate(&self, password: &str) -> Result<()>;

    async fn update_password(&self, new_password: &str) -> Result<()>;

    /// Stream of "is a user signed in" values
    fn logged_in(&self) -> watch::Receiver<bool>;
}
