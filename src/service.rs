use async_trait::async_trait;
use url::Url;

use crate::{
    Client, OAuth1Info, OAuth1Settings, OAuthParameters, Secrets, ServiceError, ServiceResult,
    Signer, TokenReaderFuture, OAUTH_TOKEN_KEY,
};

/// The remote side of the OAuth1 protocol, one implementation per provider
/// family.
#[async_trait]
pub trait OAuth1Service: Send + Sync {
    /// Whether the service implements OAuth 1.0a (the verifier step).
    fn use_10a(&self) -> bool;

    /// Obtain a request token, announcing `callback_url` to the provider.
    async fn retrieve_request_token(&self, callback_url: &str) -> ServiceResult<OAuth1Info>;

    /// Exchange an authorized request token for an access token.
    async fn retrieve_access_token(
        &self,
        info: &OAuth1Info,
        verifier: &str,
    ) -> ServiceResult<OAuth1Info>;

    /// The url the user is sent to for authorizing `token`.
    fn redirect_url(&self, token: &str) -> String;

    /// A signer for calls made on behalf of the owner of `info`.
    fn sign(&self, info: &OAuth1Info) -> Signer;
}

/// [`OAuth1Service`] talking to the provider endpoints of an
/// [`OAuth1Settings`] through reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestOAuth1Service {
    client: Client<()>,
    settings: OAuth1Settings,
    use_10a: bool,
}

impl ReqwestOAuth1Service {
    pub fn new(settings: OAuth1Settings) -> Self {
        ReqwestOAuth1Service::new_with_client(reqwest::Client::new(), settings)
    }

    pub fn new_with_client(client: reqwest::Client, settings: OAuth1Settings) -> Self {
        ReqwestOAuth1Service {
            client: Client::new_with_client(client),
            settings,
            use_10a: true,
        }
    }

    /// Talk plain OAuth 1.0 to the provider.
    ///
    /// A flow refuses to work with such a service; this exists for providers
    /// that are only used with previously obtained access tokens.
    pub fn legacy_10(self) -> Self {
        ReqwestOAuth1Service {
            use_10a: false,
            ..self
        }
    }

    pub fn settings(&self) -> &OAuth1Settings {
        &self.settings
    }

    fn endpoint(url: &str) -> ServiceResult<Url> {
        Url::parse(url).map_err(|e| ServiceError::InvalidUrl(url.to_string(), e))
    }
}

#[async_trait]
impl OAuth1Service for ReqwestOAuth1Service {
    fn use_10a(&self) -> bool {
        self.use_10a
    }

    async fn retrieve_request_token(&self, callback_url: &str) -> ServiceResult<OAuth1Info> {
        let endpoint = Self::endpoint(&self.settings.request_token_url)?;
        let params = OAuthParameters::new().callback(callback_url.to_string());
        let signer = Signer::with_params(Secrets::from_settings(&self.settings), params);

        tracing::debug!(endpoint = %endpoint, "requesting request token");
        let resp = self
            .client
            .clone()
            .with_signer(signer)
            .post(endpoint)
            .send()
            .parse_oauth_token()
            .await?;

        if self.use_10a && resp.callback_confirmed() != Some("true") {
            return Err(ServiceError::CallbackNotConfirmed(
                resp.callback_confirmed().map(str::to_string),
            ));
        }
        Ok(resp.into())
    }

    async fn retrieve_access_token(
        &self,
        info: &OAuth1Info,
        verifier: &str,
    ) -> ServiceResult<OAuth1Info> {
        let endpoint = Self::endpoint(&self.settings.access_token_url)?;
        let mut params = OAuthParameters::new();
        if self.use_10a {
            params = params.verifier(verifier.to_string());
        }
        let secrets = Secrets::from_settings(&self.settings).info(info);
        let signer = Signer::with_params(secrets, params);

        tracing::debug!(endpoint = %endpoint, "exchanging request token");
        let resp = self
            .client
            .clone()
            .with_signer(signer)
            .post(endpoint)
            .send()
            .parse_oauth_token()
            .await?;
        Ok(resp.into())
    }

    fn redirect_url(&self, token: &str) -> String {
        let extra = self
            .settings
            .authorization_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()));
        match Url::parse(&self.settings.authorization_url) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair(OAUTH_TOKEN_KEY, token)
                    .extend_pairs(extra);
                url.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "authorization url is not absolute, appending the token verbatim");
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair(OAUTH_TOKEN_KEY, token)
                    .extend_pairs(extra)
                    .finish();
                format!("{}?{}", self.settings.authorization_url, query)
            }
        }
    }

    fn sign(&self, info: &OAuth1Info) -> Signer {
        Signer::new(Secrets::from_settings(&self.settings).info(info))
    }
}
