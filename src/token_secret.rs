use std::convert::TryFrom;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use http::header::{HeaderValue, SET_COOKIE};
use http::Response;

use crate::{OAuth1Info, RequestContext, SecretError, SecretResult, SecretSettings};

/// The secret half of a request token, kept by the application between the
/// two rounds of the flow.
pub trait TokenSecret: Send + Sync {
    /// The request token secret itself.
    fn value(&self) -> &str;

    fn is_expired(&self) -> bool;

    /// The representation sent to the client.
    fn serialize(&self) -> String;
}

/// Issues a [`TokenSecret`] in the first round and hands it back in the
/// second one.
///
/// The store owns the secret for its whole lifetime and is the only party
/// concerned with how it survives between the two requests.
#[async_trait]
pub trait TokenSecretStore: Send + Sync {
    type Secret: TokenSecret;

    /// Create and stage a secret for the request token in `info`.
    async fn build(
        &self,
        provider_id: &str,
        info: &OAuth1Info,
        ctx: &RequestContext,
    ) -> SecretResult<Self::Secret>;

    /// Get the secret issued for `provider_id` back.
    ///
    /// # Errors
    ///
    /// Fails when no secret was issued, or it expired or was tampered with.
    async fn retrieve(&self, provider_id: &str, ctx: &RequestContext)
        -> SecretResult<Self::Secret>;

    /// Attach the secret to the outgoing response, leaving it untouched
    /// otherwise.
    async fn publish(
        &self,
        response: Response<()>,
        secret: &Self::Secret,
        ctx: &RequestContext,
    ) -> SecretResult<Response<()>>;
}

/// Name of the cookie carrying the secret of `provider_id`.
///
/// Flows of different providers sharing one [`SecretSettings`] each get their
/// own cookie, so a pending flow is not clobbered by another one.
pub(crate) fn cookie_name(settings: &SecretSettings, provider_id: &str) -> String {
    format!("{}_{}", settings.cookie_name, provider_id)
}

/// Point in time a secret issued now stops being valid.
pub(crate) fn expires_at(settings: &SecretSettings) -> SecretResult<DateTime<Utc>> {
    i64::try_from(settings.max_age)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or(SecretError::InvalidLifetime(settings.max_age))
}

/// Append a `Set-Cookie` header carrying `value` for `provider_id` to the
/// response.
pub(crate) fn set_cookie(
    mut response: Response<()>,
    settings: &SecretSettings,
    provider_id: &str,
    value: &str,
) -> SecretResult<Response<()>> {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path={}",
        cookie_name(settings, provider_id),
        value,
        settings.max_age,
        settings.cookie_path
    );
    if let Some(ref domain) = settings.cookie_domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if settings.secure_cookie {
        cookie.push_str("; Secure");
    }
    if settings.http_only_cookie {
        cookie.push_str("; HttpOnly");
    }
    // the provider redirects back with a top-level GET
    cookie.push_str("; SameSite=Lax");

    let header = HeaderValue::from_str(&cookie).map_err(|e| SecretError::Publish(e.to_string()))?;
    response.headers_mut().append(SET_COOKIE, header);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[test]
    fn cookie_attributes() {
        let settings = SecretSettings {
            cookie_domain: Some("example.com".to_string()),
            ..Default::default()
        };
        let resp = Response::builder()
            .status(StatusCode::SEE_OTHER)
            .body(())
            .unwrap();
        let resp = set_cookie(resp, &settings, "twitter", "abc").unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(SET_COOKIE).unwrap(),
            "OAuth1TokenSecret_twitter=abc; Max-Age=300; Path=/; Domain=example.com; Secure; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn invalid_cookie_is_reported() {
        let settings = SecretSettings {
            cookie_name: "bad\nname".to_string(),
            ..Default::default()
        };
        let resp = Response::new(());
        assert!(matches!(
            set_cookie(resp, &settings, "twitter", "abc"),
            Err(SecretError::Publish(_))
        ));
    }

    #[test]
    fn cookie_name_is_per_provider() {
        let settings = SecretSettings::default();
        assert_eq!(cookie_name(&settings, "twitter"), "OAuth1TokenSecret_twitter");
        assert_ne!(cookie_name(&settings, "twitter"), cookie_name(&settings, "xing"));
    }

    #[test]
    fn lifetime_out_of_range() {
        for max_age in &[18_446_744_073_709_551, i64::MAX as u64, u64::MAX] {
            let settings = SecretSettings {
                max_age: *max_age,
                ..Default::default()
            };
            assert_eq!(
                expires_at(&settings),
                Err(SecretError::InvalidLifetime(*max_age))
            );
        }

        let expiry = expires_at(&SecretSettings::default()).unwrap();
        assert!(expiry > Utc::now() + Duration::seconds(290));
    }
}
