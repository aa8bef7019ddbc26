use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::Response;
use sha2::Sha256;

use crate::token_secret::{cookie_name, expires_at, set_cookie};
use crate::{
    OAuth1Info, RequestContext, SecretError, SecretResult, SecretSettings, TokenSecret,
    TokenSecretStore,
};

type HmacSha256 = Hmac<Sha256>;

/// A token secret that travels to the client inside a signed cookie.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CookieSecret {
    value: String,
    provider_id: String,
    expires_at: DateTime<Utc>,
}

impl CookieSecret {
    pub fn new<V, P>(value: V, provider_id: P, expires_at: DateTime<Utc>) -> Self
    where
        V: Into<String>,
        P: Into<String>,
    {
        CookieSecret {
            value: value.into(),
            provider_id: provider_id.into(),
            expires_at,
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl TokenSecret for CookieSecret {
    fn value(&self) -> &str {
        &self.value
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Keeps the token secret on the client, in a cookie signed with
/// HMAC-SHA256 so that it can not be forged or altered.
///
/// The cookie value is `base64url(json) "." base64url(mac)`. The secret is
/// not encrypted; it only ever reaches the user agent that started the flow.
pub struct CookieSecretStore {
    signing_key: Vec<u8>,
    settings: SecretSettings,
}

impl CookieSecretStore {
    pub fn new<K>(signing_key: K, settings: SecretSettings) -> Self
    where
        K: Into<Vec<u8>>,
    {
        CookieSecretStore {
            signing_key: signing_key.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &SecretSettings {
        &self.settings
    }

    fn mac(&self) -> SecretResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| SecretError::Malformed(e.to_string()))
    }

    pub(crate) fn encode(&self, secret: &CookieSecret) -> SecretResult<String> {
        let payload = URL_SAFE_NO_PAD.encode(TokenSecret::serialize(secret));
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", payload, signature))
    }

    pub(crate) fn decode(&self, cookie: &str) -> SecretResult<CookieSecret> {
        let (payload, signature) = match cookie.split_once('.') {
            Some(parts) => parts,
            None => return Err(SecretError::Malformed("missing signature".to_string())),
        };
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SecretError::InvalidSignature)?;
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SecretError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SecretError::Malformed(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| SecretError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl TokenSecretStore for CookieSecretStore {
    type Secret = CookieSecret;

    async fn build(
        &self,
        provider_id: &str,
        info: &OAuth1Info,
        _ctx: &RequestContext,
    ) -> SecretResult<CookieSecret> {
        Ok(CookieSecret::new(
            info.secret.as_str(),
            provider_id,
            expires_at(&self.settings)?,
        ))
    }

    async fn retrieve(&self, provider_id: &str, ctx: &RequestContext) -> SecretResult<CookieSecret> {
        let cookie = ctx
            .cookie(&cookie_name(&self.settings, provider_id))
            .ok_or_else(|| SecretError::NotFound(provider_id.to_string()))?;
        let secret = self.decode(cookie)?;
        if secret.provider_id != provider_id {
            return Err(SecretError::NotFound(provider_id.to_string()));
        }
        if secret.is_expired() {
            return Err(SecretError::Expired(provider_id.to_string()));
        }
        Ok(secret)
    }

    async fn publish(
        &self,
        response: Response<()>,
        secret: &CookieSecret,
        _ctx: &RequestContext,
    ) -> SecretResult<Response<()>> {
        let value = self.encode(secret)?;
        set_cookie(response, &self.settings, &secret.provider_id, &value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use http::header::{COOKIE, SET_COOKIE};
    use http::{HeaderMap, HeaderValue};

    use super::*;

    fn store() -> CookieSecretStore {
        CookieSecretStore::new("signing-key", SecretSettings::default())
    }

    fn request_with_cookie(value: &str) -> RequestContext {
        request_with_cookies(&[("twitter", value)])
    }

    fn request_with_cookies(cookies: &[(&str, &str)]) -> RequestContext {
        let cookies = cookies
            .iter()
            .map(|(provider_id, value)| format!("OAuth1TokenSecret_{}={}", provider_id, value))
            .collect::<Vec<_>>()
            .join("; ");
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&cookies).unwrap());
        RequestContext::new("www.example.com", "/auth/twitter").headers(headers)
    }

    #[tokio::test]
    async fn publish_then_retrieve() {
        let store = store();
        let ctx = RequestContext::new("www.example.com", "/auth/twitter");
        let info = OAuth1Info::new("request-token", "request-secret");

        let secret = store.build("twitter", &info, &ctx).await.unwrap();
        assert_eq!(secret.value(), "request-secret");
        assert!(!secret.is_expired());

        let resp = store.publish(Response::new(()), &secret, &ctx).await.unwrap();
        let set_cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let value = set_cookie
            .strip_prefix("OAuth1TokenSecret_twitter=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();

        let retrieved = store
            .retrieve("twitter", &request_with_cookie(value))
            .await
            .unwrap();
        assert_eq!(retrieved, secret);
    }

    #[tokio::test]
    async fn missing_cookie() {
        let err = store()
            .retrieve("twitter", &RequestContext::new("h", "/"))
            .await
            .unwrap_err();
        assert_eq!(err, SecretError::NotFound("twitter".to_string()));
    }

    #[tokio::test]
    async fn tampered_cookie() {
        let store = store();
        let secret = CookieSecret::new("s", "twitter", Utc::now() + Duration::minutes(5));
        let value = store.encode(&secret).unwrap();

        let forged = CookieSecret::new("other", "twitter", Utc::now() + Duration::minutes(5));
        let forged_payload = store.encode(&forged).unwrap();
        let (forged_payload, _) = forged_payload.split_once('.').unwrap();
        let (_, signature) = value.split_once('.').unwrap();

        let err = store
            .retrieve(
                "twitter",
                &request_with_cookie(&format!("{}.{}", forged_payload, signature)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, SecretError::InvalidSignature);

        let other_key = CookieSecretStore::new("another-key", SecretSettings::default());
        let err = other_key
            .retrieve("twitter", &request_with_cookie(&value))
            .await
            .unwrap_err();
        assert_eq!(err, SecretError::InvalidSignature);
    }

    #[tokio::test]
    async fn expired_secret_is_rejected() {
        let store = store();
        let secret = CookieSecret::new("s", "twitter", Utc::now() - Duration::seconds(1));
        assert!(secret.is_expired());
        let value = store.encode(&secret).unwrap();

        let err = store
            .retrieve("twitter", &request_with_cookie(&value))
            .await
            .unwrap_err();
        assert_eq!(err, SecretError::Expired("twitter".to_string()));
    }

    #[tokio::test]
    async fn secret_of_other_provider() {
        let store = store();
        let secret = CookieSecret::new("s", "xing", Utc::now() + Duration::minutes(5));
        let value = store.encode(&secret).unwrap();

        let err = store
            .retrieve("twitter", &request_with_cookie(&value))
            .await
            .unwrap_err();
        assert_eq!(err, SecretError::NotFound("twitter".to_string()));
    }

    #[test]
    fn malformed_cookie() {
        assert!(matches!(
            store().decode("no-signature"),
            Err(SecretError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn providers_do_not_share_a_cookie() {
        let store = store();
        let ctx = RequestContext::new("www.example.com", "/auth");
        let twitter = store
            .build("twitter", &OAuth1Info::new("t1", "twitter-secret"), &ctx)
            .await
            .unwrap();
        let xing = store
            .build("xing", &OAuth1Info::new("t2", "xing-secret"), &ctx)
            .await
            .unwrap();

        let twitter_resp = store.publish(Response::new(()), &twitter, &ctx).await.unwrap();
        let xing_resp = store.publish(Response::new(()), &xing, &ctx).await.unwrap();
        let twitter_cookie = twitter_resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let xing_cookie = xing_resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(twitter_cookie.starts_with("OAuth1TokenSecret_twitter="));
        assert!(xing_cookie.starts_with("OAuth1TokenSecret_xing="));

        let value_of = |cookie: &str| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.split_once('='))
                .map(|(_, value)| value.to_string())
                .unwrap()
        };
        let twitter_value = value_of(twitter_cookie);
        let xing_value = value_of(xing_cookie);
        let ctx = request_with_cookies(&[
            ("twitter", twitter_value.as_str()),
            ("xing", xing_value.as_str()),
        ]);
        assert_eq!(store.retrieve("twitter", &ctx).await.unwrap(), twitter);
        assert_eq!(store.retrieve("xing", &ctx).await.unwrap(), xing);
    }

    #[tokio::test]
    async fn lifetime_out_of_range_is_an_error() {
        let ctx = RequestContext::new("www.example.com", "/auth/twitter");
        let info = OAuth1Info::new("request-token", "request-secret");
        for max_age in &[18_446_744_073_709_551, u64::MAX] {
            let store = CookieSecretStore::new(
                "signing-key",
                SecretSettings {
                    max_age: *max_age,
                    ..Default::default()
                },
            );
            let err = store.build("twitter", &info, &ctx).await.unwrap_err();
            assert_eq!(err, SecretError::InvalidLifetime(*max_age));
        }
    }
}
