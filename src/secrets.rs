use std::fmt;

use crate::{OAuth1Info, OAuth1Settings};

/// Supplies the credentials a request is signed with.
pub trait SecretsProvider {
    fn get_consumer_key_pair(&self) -> (&str, &str);

    fn get_token_pair_option(&self) -> Option<(&str, &str)>;

    fn get_token_option_pair(&self) -> (Option<&str>, Option<&str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or((None, None))
    }
}

/// Consumer credentials, optionally paired with a token.
///
/// Without a token the secrets sign the request-token leg; with the request
/// token they sign the access-token leg, and with the access token every
/// authenticated API call afterwards.
#[derive(Clone)]
pub struct Secrets {
    consumer_key: String,
    consumer_secret: String,
    token: Option<OAuth1Info>,
}

impl Secrets {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Secrets {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    /// Consumer credentials of the given provider settings.
    pub fn from_settings(settings: &OAuth1Settings) -> Self {
        Secrets::new(
            settings.consumer_key.as_str(),
            settings.consumer_secret.as_str(),
        )
    }

    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Secrets {
            token: Some(OAuth1Info::new(token, token_secret)),
            ..self
        }
    }

    pub fn info(self, info: &OAuth1Info) -> Self {
        Secrets {
            token: Some(info.clone()),
            ..self
        }
    }
}

impl SecretsProvider for Secrets {
    fn get_consumer_key_pair(&self) -> (&str, &str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair_option(&self) -> Option<(&str, &str)> {
        self.token
            .as_ref()
            .map(|info| (info.token.as_str(), info.secret.as_str()))
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("consumer_key", &self.consumer_key)
            .field("token", &self.token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumer_only() {
        let secrets = Secrets::new("ck", "cs");
        assert_eq!(secrets.get_consumer_key_pair(), ("ck", "cs"));
        assert_eq!(secrets.get_token_option_pair(), (None, None));
    }

    #[test]
    fn with_request_token() {
        let info = OAuth1Info::new("rt", "request-secret");
        let secrets = Secrets::new("ck", "consumer-secret").info(&info);
        assert_eq!(secrets.get_token_pair_option(), Some(("rt", "request-secret")));

        let printed = format!("{:?}", secrets);
        assert!(!printed.contains("consumer-secret"));
        assert!(!printed.contains("request-secret"));
    }
}
