use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TokenResponse;

/// A token and token secret pair issued by the provider.
///
/// Holds the request token between the two rounds of the flow, and the access
/// token once the flow has completed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Info {
    pub token: String,
    pub secret: String,
}

impl OAuth1Info {
    pub fn new<TToken, TSecret>(token: TToken, secret: TSecret) -> Self
    where
        TToken: Into<String>,
        TSecret: Into<String>,
    {
        OAuth1Info {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

// the secret half is kept out of logs
impl fmt::Debug for OAuth1Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Info")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl From<TokenResponse> for OAuth1Info {
    fn from(resp: TokenResponse) -> Self {
        OAuth1Info {
            token: resp.oauth_token,
            secret: resp.oauth_token_secret,
        }
    }
}
