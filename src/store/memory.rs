//! In-memory profile store holding JSON documents keyed by uid.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::traits::ProfileStore;
use crate::auth::Principal;
use crate::error::StoreError;
use crate::onboarding::model::UserProfile;
use crate::onboarding::state::{OnboardingCategory, OnboardingFlags};

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Value>,
    /// username -> uid
    usernames: HashMap<String, String>,
}

/// Profile store kept entirely in process memory.
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: RwLock<Inner>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document as-is, replacing any existing one.
    ///
    /// Its username is indexed lowercased, unless another uid already owns it.
    pub async fn insert_document(&self, uid: &str, document: Value) {
        let mut inner = self.inner.write().await;
        inner.usernames.retain(|_, owner| owner != uid);
        if let Some(name) = document.get("username").and_then(Value::as_str) {
            let name = name.trim().to_lowercase();
            if !name.is_empty() && !inner.usernames.contains_key(&name) {
                inner.usernames.insert(name, uid.to_string());
            }
        }
        inner.documents.insert(uid.to_string(), document);
    }

    /// Raw document for a uid, if any.
    pub async fn document(&self, uid: &str) -> Option<Value> {
        self.inner.read().await.documents.get(uid).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn parse(uid: &str, document: &Value) -> Result<UserProfile, StoreError> {
    serde_json::from_value(document.clone()).map_err(|e| StoreError::Malformed {
        uid: uid.to_string(),
        reason: e.to_string(),
    })
}

/// Mutable object view of a stored document.
fn object_mut<'a>(
    documents: &'a mut HashMap<String, Value>,
    uid: &str,
) -> Result<&'a mut Map<String, Value>, StoreError> {
    documents
        .get_mut(uid)
        .ok_or_else(|| StoreError::NotFound {
            uid: uid.to_string(),
        })?
        .as_object_mut()
        .ok_or_else(|| StoreError::Malformed {
            uid: uid.to_string(),
            reason: "document is not an object".to_string(),
        })
}

fn touch(object: &mut Map<String, Value>) {
    object.insert("updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn upsert(&self, principal: &Principal) -> Result<OnboardingCategory, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.documents.contains_key(&principal.uid) {
            let profile = UserProfile::from_principal(principal, Utc::now());
            let document = serde_json::to_value(&profile).map_err(|e| StoreError::Malformed {
                uid: principal.uid.clone(),
                reason: e.to_string(),
            })?;
            inner.documents.insert(principal.uid.clone(), document);
            debug!(uid = %principal.uid, "Registered new profile");
            return Ok(OnboardingCategory::NewUserNeedsBoth);
        }

        match parse(&principal.uid, &inner.documents[&principal.uid]) {
            Ok(profile) => Ok(OnboardingCategory::for_existing(
                profile.username_is_set(),
                profile.phone_number_is_set(),
            )),
            Err(e) => {
                warn!(uid = %principal.uid, error = %e, "Unrecognised onboarding state");
                Ok(OnboardingCategory::Error)
            }
        }
    }

    async fn persist_flags(&self, uid: &str, flags: OnboardingFlags) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let object = object_mut(&mut inner.documents, uid)?;
        object.insert("hasUsername".to_string(), Value::Bool(flags.has_username));
        object.insert(
            "hasPhoneNumber".to_string(),
            Value::Bool(flags.has_phone_number),
        );
        touch(object);
        Ok(())
    }

    async fn fetch_profile(&self, uid: &str) -> Result<UserProfile, StoreError> {
        let inner = self.inner.read().await;
        let document = inner.documents.get(uid).ok_or_else(|| StoreError::NotFound {
            uid: uid.to_string(),
        })?;
        parse(uid, document)
    }

    async fn claim_username(&self, uid: &str, username: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.documents.contains_key(uid) {
            return Err(StoreError::NotFound {
                uid: uid.to_string(),
            });
        }
        if inner.usernames.get(username).is_some_and(|owner| owner != uid) {
            return Err(StoreError::Conflict {
                field: "username".to_string(),
                value: username.to_string(),
            });
        }

        let object = object_mut(&mut inner.documents, uid)?;
        object.insert("username".to_string(), Value::String(username.to_string()));
        touch(object);

        inner.usernames.retain(|_, owner| owner != uid);
        inner.usernames.insert(username.to_string(), uid.to_string());
        Ok(())
    }

    async fn set_phone_number(&self, uid: &str, phone_number: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let object = object_mut(&mut inner.documents, uid)?;
        object.insert(
            "phoneNumber".to_string(),
            Value::String(phone_number.to_string()),
        );
        touch(object);
        Ok(())
    }
}
