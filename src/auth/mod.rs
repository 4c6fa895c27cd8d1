//! Identity: sign-in/sign-out plus an auth-state subscription.
//!
//! A view acquires a [`Subscription`] when it becomes active and drops it when
//! it goes away; there is no ambient global session object.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{error, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::UserProfile;

/// Keys written to persisted local state on sign-in and removed on sign-out.
pub const PROFILE_KEYS: [&str; 3] = ["name", "email", "profilePic"];

/// Credentials accepted by [`LocalIdentity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignInRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

type Callback = Arc<dyn Fn(Option<&UserProfile>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Handle for a registered auth-state callback. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Unsubscribe now. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).callbacks.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An identity provider: signs users in and out and reports auth-state changes.
pub trait IdentityProvider {
    fn sign_in(&self, request: &SignInRequest) -> Result<UserProfile>;

    fn sign_out(&self) -> Result<()>;

    /// The signed-in user. Provider failures count as signed out.
    fn current_user(&self) -> Option<UserProfile>;

    /// Register `callback`. It fires once right away with the current state,
    /// then after every sign-in and sign-out, until the handle is dropped.
    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&UserProfile>) + Send + Sync + 'static;
}

/// Identity provider that keeps the signed-in account in the database.
pub struct LocalIdentity {
    db: Mutex<Database>,
    listeners: Arc<Mutex<Listeners>>,
}

impl LocalIdentity {
    pub fn new(db: Database) -> Self {
        LocalIdentity {
            db: Mutex::new(db),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Run every callback outside the lock, so a callback may drop its own
    /// subscription or register another one.
    fn notify(&self, user: Option<&UserProfile>) {
        let callbacks: Vec<Callback> = lock(&self.listeners)
            .callbacks
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(user);
        }
    }
}

impl IdentityProvider for LocalIdentity {
    fn sign_in(&self, request: &SignInRequest) -> Result<UserProfile> {
        let name = request.name.trim();
        let email = request.email.trim();
        if name.is_empty() {
            return Err(Error::Validation("display name must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(Error::Validation(format!("invalid email: {email}")));
        }
        let user = UserProfile {
            display_name: name.to_string(),
            email: email.to_string(),
            avatar_url: request
                .avatar_url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        lock(&self.db).set_session_user(&user)?;
        info!(email = %user.email, "user signed in");
        self.notify(Some(&user));
        Ok(user)
    }

    fn sign_out(&self) -> Result<()> {
        lock(&self.db).clear_session_user()?;
        info!("user signed out");
        self.notify(None);
        Ok(())
    }

    fn current_user(&self) -> Option<UserProfile> {
        match lock(&self.db).session_user() {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "failed to read session; treating as signed out");
                None
            }
        }
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&UserProfile>) + Send + Sync + 'static,
    {
        callback(self.current_user().as_ref());
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.callbacks.insert(id, Arc::new(callback));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }
}

/// App-side session: wraps a provider and mirrors the profile into local state.
///
/// The mirrored entries are write-only from the app's point of view; whether
/// someone is signed in is always asked of the provider.
pub struct Session<P> {
    provider: P,
    local: Mutex<Database>,
}

impl<P: IdentityProvider> Session<P> {
    pub fn new(provider: P, local: Database) -> Self {
        Session {
            provider,
            local: Mutex::new(local),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sign_in(&self, request: &SignInRequest) -> Result<UserProfile> {
        let user = self
            .provider
            .sign_in(request)
            .inspect_err(|e| error!(error = %e, "sign-in failed"))?;
        // The provider already holds the session; a failed mirror is only logged.
        if let Err(e) = self.mirror_profile(&user) {
            error!(error = %e, "failed to store local profile");
        }
        Ok(user)
    }

    fn mirror_profile(&self, user: &UserProfile) -> Result<()> {
        let local = lock(&self.local);
        local.set_config("name", &user.display_name)?;
        local.set_config("email", &user.email)?;
        match &user.avatar_url {
            Some(url) => local.set_config("profilePic", url),
            None => local.delete_config("profilePic"),
        }
    }

    pub fn sign_out(&self) -> Result<()> {
        self.provider
            .sign_out()
            .inspect_err(|e| error!(error = %e, "sign-out failed"))?;
        let local = lock(&self.local);
        for key in PROFILE_KEYS {
            if let Err(e) = local.delete_config(key) {
                error!(%key, error = %e, "failed to clear local profile entry");
            }
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.provider.current_user()
    }

    /// Fails with `Unauthorized` when nobody is signed in.
    pub fn require_user(&self) -> Result<UserProfile> {
        self.current_user().ok_or(Error::Unauthorized)
    }

    /// Subscribe a view to auth-state changes for as long as it holds the handle.
    pub fn activate<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(Option<&UserProfile>) + Send + Sync + 'static,
    {
        self.provider.subscribe(on_change)
    }
}
