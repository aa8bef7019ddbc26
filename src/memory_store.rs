use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::Response;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::token_secret::{cookie_name, expires_at, set_cookie};
use crate::{
    OAuth1Info, RequestContext, SecretError, SecretResult, SecretSettings, TokenSecret,
    TokenSecretStore,
};

/// A token secret kept on the server; only its correlation id is sent to
/// the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySecret {
    id: String,
    provider_id: String,
    value: String,
    expires_at: DateTime<Utc>,
}

impl MemorySecret {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }
}

impl TokenSecret for MemorySecret {
    fn value(&self) -> &str {
        &self.value
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    fn serialize(&self) -> String {
        self.id.clone()
    }
}

/// Server-side store keyed by provider id and a random correlation id.
///
/// A secret can be retrieved once; retrieving it removes it. Suitable for a
/// single process; clustered deployments want the [`CookieSecretStore`]
/// or a shared store of their own.
///
/// [`CookieSecretStore`]: crate::CookieSecretStore
pub struct InMemorySecretStore {
    settings: SecretSettings,
    secrets: Mutex<HashMap<(String, String), MemorySecret>>,
}

impl InMemorySecretStore {
    pub fn new(settings: SecretSettings) -> Self {
        InMemorySecretStore {
            settings,
            secrets: Mutex::new(HashMap::new()),
        }
    }

    /// Number of secrets currently staged.
    pub fn len(&self) -> usize {
        self.secrets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, secret: MemorySecret) {
        let mut secrets = self.secrets.lock();
        // abandoned flows never come back for their secret
        secrets.retain(|_, s| !s.is_expired());
        secrets.insert((secret.provider_id.clone(), secret.id.clone()), secret);
    }
}

impl Default for InMemorySecretStore {
    fn default() -> Self {
        InMemorySecretStore::new(SecretSettings::default())
    }
}

#[async_trait]
impl TokenSecretStore for InMemorySecretStore {
    type Secret = MemorySecret;

    async fn build(
        &self,
        provider_id: &str,
        info: &OAuth1Info,
        _ctx: &RequestContext,
    ) -> SecretResult<MemorySecret> {
        let secret = MemorySecret {
            id: Uuid::new_v4().to_string(),
            provider_id: provider_id.to_string(),
            value: info.secret.clone(),
            expires_at: expires_at(&self.settings)?,
        };
        self.insert(secret.clone());
        Ok(secret)
    }

    async fn retrieve(&self, provider_id: &str, ctx: &RequestContext) -> SecretResult<MemorySecret> {
        let not_found = || SecretError::NotFound(provider_id.to_string());
        let id = ctx
            .cookie(&cookie_name(&self.settings, provider_id))
            .ok_or_else(not_found)?;
        let secret = self
            .secrets
            .lock()
            .remove(&(provider_id.to_string(), id.to_string()))
            .ok_or_else(not_found)?;
        if secret.is_expired() {
            return Err(SecretError::Expired(provider_id.to_string()));
        }
        Ok(secret)
    }

    async fn publish(
        &self,
        response: Response<()>,
        secret: &MemorySecret,
        _ctx: &RequestContext,
    ) -> SecretResult<Response<()>> {
        set_cookie(
            response,
            &self.settings,
            &secret.provider_id,
            &secret.serialize(),
        )
    }
}
