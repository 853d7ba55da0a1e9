//! Process-wide auth state: the locally cached user and the "data loaded" flag.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::onboarding::model::UserProfile;

/// Receives the results of a completed reconciliation.
///
/// Both calls are synchronous so nothing can be interleaved between
/// publishing the user and raising the loaded flag.
pub trait AuthObserver: Send + Sync {
    fn set_data_loaded(&self, loaded: bool);

    fn publish_local_user(&self, profile: UserProfile);
}

/// Point-in-time view of the auth state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthSnapshot {
    pub local_user: Option<UserProfile>,
    pub data_loaded: bool,
}

/// Observable auth state backed by a watch channel.
pub struct AuthState {
    tx: watch::Sender<AuthSnapshot>,
}

impl AuthState {
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = watch::channel(AuthSnapshot::default());
        Arc::new(Self { tx })
    }

    /// Subscribe to state changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// Drop the local user and lower the loaded flag in one update.
    pub fn sign_out(&self) {
        let previous = self.tx.send_replace(AuthSnapshot::default());
        if let Some(user) = previous.local_user {
            info!(uid = %user.uid, "Signed out");
        }
    }
}

impl AuthObserver for AuthState {
    fn set_data_loaded(&self, loaded: bool) {
        self.tx.send_modify(|state| state.data_loaded = loaded);
        debug!(loaded, "Auth data-loaded flag set");
    }

    fn publish_local_user(&self, profile: UserProfile) {
        debug!(uid = %profile.uid, "Publishing local user");
        self.tx.send_modify(|state| state.local_user = Some(profile));
    }
}
