use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Static configuration of one OAuth1 provider.
///
/// `callback_url` may be relative (`/auth/twitter` or `auth/twitter`); it is
/// resolved against every inbound request separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Settings {
    pub request_token_url: String,
    pub access_token_url: String,
    pub authorization_url: String,
    pub callback_url: String,
    #[serde(default)]
    pub api_url: Option<String>,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Extra query parameters appended to the authorization redirect.
    #[serde(default)]
    pub authorization_params: Vec<(String, String)>,
}

impl OAuth1Settings {
    pub fn new<'a, TKey, TSecret>(
        request_token_url: impl Into<String>,
        access_token_url: impl Into<String>,
        authorization_url: impl Into<String>,
        callback_url: impl Into<String>,
        consumer_key: TKey,
        consumer_secret: TSecret,
    ) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        OAuth1Settings {
            request_token_url: request_token_url.into(),
            access_token_url: access_token_url.into(),
            authorization_url: authorization_url.into(),
            callback_url: callback_url.into(),
            api_url: None,
            consumer_key: consumer_key.into().into_owned(),
            consumer_secret: consumer_secret.into().into_owned(),
            authorization_params: Vec::new(),
        }
    }

    /// Endpoints of Twitter's OAuth 1.0a service.
    pub fn twitter<'a, TKey, TSecret>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        callback_url: impl Into<String>,
    ) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        OAuth1Settings::new(
            "https://api.twitter.com/oauth/request_token",
            "https://api.twitter.com/oauth/access_token",
            "https://api.twitter.com/oauth/authenticate",
            callback_url,
            consumer_key,
            consumer_secret,
        )
        .api_url("https://api.twitter.com/1.1/account/verify_credentials.json")
    }

    /// Endpoints of XING's OAuth 1.0a service.
    pub fn xing<'a, TKey, TSecret>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        callback_url: impl Into<String>,
    ) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        OAuth1Settings::new(
            "https://api.xing.com/v1/request_token",
            "https://api.xing.com/v1/access_token",
            "https://api.xing.com/v1/authorize",
            callback_url,
            consumer_key,
            consumer_secret,
        )
        .api_url("https://api.xing.com/v1/users/me")
    }

    pub fn api_url<T>(self, api_url: T) -> Self
    where
        T: Into<String>,
    {
        OAuth1Settings {
            api_url: Some(api_url.into()),
            ..self
        }
    }

    /// add a query parameter to the authorization redirect
    pub fn authorization_param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.authorization_params.push((key.into(), value.into()));
        self
    }
}

/// Cookie and lifetime configuration shared by the bundled secret stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    /// Prefix of the cookie name; the provider id is appended, giving
    /// `OAuth1TokenSecret_twitter` by default.
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub secure_cookie: bool,
    pub http_only_cookie: bool,
    /// Lifetime of an issued secret, in seconds. Building a secret fails
    /// with [`SecretError::InvalidLifetime`] when it does not fit a date.
    ///
    /// [`SecretError::InvalidLifetime`]: crate::SecretError::InvalidLifetime
    pub max_age: u64,
}

impl Default for SecretSettings {
    fn default() -> Self {
        SecretSettings {
            cookie_name: "OAuth1TokenSecret".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            secure_cookie: true,
            http_only_cookie: true,
            max_age: 5 * 60,
        }
    }
}
