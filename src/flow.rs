use std::fmt;
use std::sync::Arc;

use http::header::LOCATION;
use http::{Response, StatusCode};

use crate::callback::resolve_callback_url;
use crate::{
    Client, Error, OAuth1Info, OAuth1Service, OAuth1Settings, RequestBuilder, RequestContext,
    Result, SecretError, ServiceError, Signer, TokenLeg, TokenSecret, TokenSecretStore, DENIED_KEY, OAUTH_TOKEN_KEY,
    OAUTH_VERIFIER_KEY,
};

/// What the hosting application does with an inbound request of the flow.
#[derive(Debug)]
pub enum FlowOutcome {
    /// Send this response back; it redirects the user to the provider and
    /// carries the published token secret.
    Redirect(Response<()>),
    /// The handshake is complete.
    AuthInfo(OAuth1Info),
}

/// Drives the OAuth 1.0a three-legged handshake for one provider.
///
/// The flow keeps no state between requests. Which round a request belongs
/// to is read from its query parameters, and the request token secret
/// travels between the rounds through the [`TokenSecretStore`].
pub struct OAuth1Flow<T> {
    id: String,
    http: reqwest::Client,
    service: Arc<dyn OAuth1Service>,
    store: T,
    settings: OAuth1Settings,
}

impl<T> fmt::Debug for OAuth1Flow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Flow")
            .field("id", &self.id)
            .field("callback_url", &self.settings.callback_url)
            .finish()
    }
}

impl<T> OAuth1Flow<T>
where
    T: TokenSecretStore,
{
    /// # Errors
    ///
    /// Fails with [`Error::ConfigurationViolation`] when `service` does not
    /// implement OAuth 1.0a.
    pub fn new<I>(
        id: I,
        http: reqwest::Client,
        service: Arc<dyn OAuth1Service>,
        store: T,
        settings: OAuth1Settings,
    ) -> Result<Self>
    where
        I: Into<String>,
    {
        let id = id.into();
        if !service.use_10a() {
            tracing::error!(provider = %id, "refusing to use an OAuth 1.0 service without verifier support");
            return Err(Error::ConfigurationViolation { provider_id: id });
        }
        Ok(OAuth1Flow {
            id,
            http,
            service,
            store,
            settings,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &OAuth1Settings {
        &self.settings
    }

    pub fn service(&self) -> &dyn OAuth1Service {
        self.service.as_ref()
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Handle one inbound request of the flow.
    ///
    /// * `denied` present: the user declined, fails without contacting anyone.
    /// * `oauth_verifier` and `oauth_token` present: second round, the request
    ///   token is exchanged for the access token.
    /// * otherwise: first round, a request token is obtained and the user is
    ///   redirected to the provider.
    pub async fn authenticate(&self, ctx: &RequestContext) -> Result<FlowOutcome> {
        if let Some(reason) = ctx.query(DENIED_KEY) {
            tracing::warn!(provider = %self.id, reason, "authorization denied");
            return Err(Error::AccessDenied {
                provider_id: self.id.clone(),
                reason: reason.to_string(),
            });
        }
        match (ctx.query(OAUTH_VERIFIER_KEY), ctx.query(OAUTH_TOKEN_KEY)) {
            (Some(verifier), Some(token)) => self.exchange(ctx, token, verifier).await,
            _ => self.redirect(ctx).await,
        }
    }

    /// A client over the flow's transport signing with the access token.
    pub fn signed_client(&self, info: &OAuth1Info) -> Client<Signer> {
        Client::new_with_client(self.http.clone()).with_signer(self.service.sign(info))
    }

    /// A signed `GET` to the provider's `api_url`, usually the account of the
    /// user who just signed in. `None` when no `api_url` is configured.
    pub fn api_request(&self, info: &OAuth1Info) -> Option<RequestBuilder<Signer>> {
        let api_url = self.settings.api_url.as_deref()?;
        Some(self.signed_client(info).get(api_url))
    }

    async fn redirect(&self, ctx: &RequestContext) -> Result<FlowOutcome> {
        let callback_url = resolve_callback_url(
            &self.settings.callback_url,
            ctx.is_secure(),
            ctx.host(),
            ctx.path(),
        );
        tracing::debug!(provider = %self.id, callback_url = %callback_url, "retrieving request token");

        let info = self
            .service
            .retrieve_request_token(&callback_url)
            .await
            .map_err(|source| {
                tracing::warn!(provider = %self.id, error = %source, "request token retrieval failed");
                Error::UnexpectedResponse {
                    provider_id: self.id.clone(),
                    leg: TokenLeg::RequestToken,
                    source,
                }
            })?;

        let secret = self
            .store
            .build(&self.id, &info, ctx)
            .await
            .map_err(|source| self.secret_unavailable(source))?;
        let redirect_url = self.service.redirect_url(&info.token);
        let response = Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header(LOCATION, redirect_url.as_str())
            .body(())
            .map_err(|_| Error::UnexpectedResponse {
                provider_id: self.id.clone(),
                leg: TokenLeg::RequestToken,
                source: ServiceError::InvalidRedirect(redirect_url.clone()),
            })?;
        let response = self
            .store
            .publish(response, &secret, ctx)
            .await
            .map_err(|source| self.secret_unavailable(source))?;

        tracing::debug!(provider = %self.id, redirect_url = %redirect_url, "redirecting to provider");
        Ok(FlowOutcome::Redirect(response))
    }

    async fn exchange(&self, ctx: &RequestContext, token: &str, verifier: &str) -> Result<FlowOutcome> {
        let secret = self
            .store
            .retrieve(&self.id, ctx)
            .await
            .map_err(|source| self.secret_unavailable(source))?;
        if secret.is_expired() {
            return Err(self.secret_unavailable(SecretError::Expired(self.id.clone())));
        }
        tracing::debug!(provider = %self.id, "retrieving access token");

        let request_token = OAuth1Info::new(token, secret.value());
        let info = self
            .service
            .retrieve_access_token(&request_token, verifier)
            .await
            .map_err(|source| {
                tracing::warn!(provider = %self.id, error = %source, "access token retrieval failed");
                Error::UnexpectedResponse {
                    provider_id: self.id.clone(),
                    leg: TokenLeg::AccessToken,
                    source,
                }
            })?;
        Ok(FlowOutcome::AuthInfo(info))
    }

    fn secret_unavailable(&self, source: SecretError) -> Error {
        tracing::warn!(provider = %self.id, error = %source, "token secret unavailable");
        Error::SecretUnavailable {
            provider_id: self.id.clone(),
            source,
        }
    }
}
