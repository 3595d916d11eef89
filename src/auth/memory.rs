//! In-process identity provider

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use super::AuthProvider;
use crate::error::{Error, Result};
use crate::model::Session;

const MIN_PROVIDER_PASSWORD: usize = 6;

struct Account {
    uid: String,
    password: String,
}

/// Accounts held in memory, keyed by lower-cased email
pub struct InMemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    session: watch::Sender<Option<Session>>,
    logged_in: watch::Sender<bool>,
    calls: AtomicUsize,
    fail_next: Mutex<Option<String>>,
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuth {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        let (logged_in, _) = watch::channel(false);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
            logged_in,
            calls: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        }
    }

    /// Number of remote-style calls received (account creation, sign in)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next provider call fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(message.into());
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().map(|accounts| accounts.len()).unwrap_or(0)
    }

    fn record_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_next.lock().ok().and_then(|mut slot| slot.take()) {
            Some(message) => Err(Error::Backend(message)),
            None => Ok(()),
        }
    }

    fn set_session(&self, session: Option<Session>) {
        let signed_in = session.is_some();
        self.session.send_replace(session);
        self.logged_in.send_replace(signed_in);
    }

    fn key(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }

    fn lock_accounts(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>> {
        self.accounts
            .lock()
            .map_err(|_| Error::Backend("Account table poisoned".to_string()))
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session> {
        self.record_call()?;
        if password.chars().count() < MIN_PROVIDER_PASSWORD {
            return Err(Error::WeakPassword);
        }

        let key = Self::key(email);
        let session = {
            let mut accounts = self.lock_accounts()?;
            if accounts.contains_key(&key) {
                return Err(Error::AccountExists(key));
            }
            let uid = Uuid::new_v4().simple().to_string();
            accounts.insert(
                key.clone(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            Session { uid, email: key }
        };

        tracing::info!(uid = %session.uid, "Account created");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.record_call()?;
        let key = Self::key(email);
        let session = {
            let accounts = self.lock_accounts()?;
            match accounts.get(&key) {
                Some(account) if account.password == password => Session {
                    uid: account.uid.clone(),
                    email: key,
                },
                _ => {
                    return Err(Error::InvalidCredentials(
                        "The email or password is incorrect".to_string(),
                    ));
                }
            }
        };

        tracing::info!(uid = %session.uid, "Signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) {
        if let Some(session) = self.current_session() {
            tracing::info!(uid = %session.uid, "Signed out");
        }
        self.set_session(None);
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    async fn delete_current(&self) -> Result<()> {
        let session = self.current_session().ok_or(Error::NotSignedIn)?;
        self.lock_accounts()?.remove(&session.email);
        tracing::warn!(uid = %session.uid, "Account deleted");
        self.set_session(None);
        Ok(())
    }

    async fn reauthenticate(&self, password: &str) -> Result<()> {
        let session = self.current_session().ok_or(Error::NotSignedIn)?;
        let accounts = self.lock_accounts()?;
        match accounts.get(&session.email) {
            Some(account) if account.password == password => Ok(()),
            Some(_) => Err(Error::WrongPassword),
            None => Err(Error::NotSignedIn),
        }
    }

    async fn update_password(&self, new_password: &str) -> Result<()> {
        if new_password.chars().count() < MIN_PROVIDER_PASSWORD {
            return Err(Error::WeakPassword);
        }
        let session = self.current_session().ok_or(Error::NotSignedIn)?;
        let mut accounts = self.lock_accounts()?;
        let account = accounts.get_mut(&session.email).ok_or(Error::NotSignedIn)?;
        account.password = new_password.to_string();
        Ok(())
    }

    fn logged_in(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }
}
