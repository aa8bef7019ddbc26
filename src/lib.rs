/*!
reqwest-oauth1-flow: the OAuth 1.0a three-legged handshake on top of reqwest.

Repository is here: https://github.com/karno/reqwest-oauth1

# Overview

This library drives the "sign in with an OAuth 1.0a provider" handshake
(request token, user authorization, access token) for any web framework.
The hosting application turns each inbound request of the flow into a
[`RequestContext`], hands it to [`OAuth1Flow::authenticate`] and acts on the
[`FlowOutcome`]: either a redirect to send back, or the access token.

Requests to the provider are signed with [oauth1-request](https://crates.io/crates/oauth1-request)
and sent with [reqwest](https://crates.io/crates/reqwest).

Only OAuth 1.0a services are accepted. OAuth 1.0 without the verifier step is
open to session fixation, and a flow refuses to be built on top of it.

# How to use

```rust,no_run
use std::sync::Arc;

use reqwest_oauth1_flow::{
    CookieSecretStore, FlowOutcome, OAuth1Flow, OAuth1Settings, ReqwestOAuth1Service,
    RequestContext, SecretSettings,
};

# async fn handle(req: http::Request<()>) -> Result<(), reqwest_oauth1_flow::Error> {
let settings = OAuth1Settings::twitter("[CONSUMER_KEY]", "[CONSUMER_SECRET]", "/auth/twitter");
let service = ReqwestOAuth1Service::new(settings.clone());
let store = CookieSecretStore::new("[COOKIE_SIGNING_KEY]", SecretSettings::default());
let flow = OAuth1Flow::new(
    "twitter",
    reqwest::Client::new(),
    Arc::new(service),
    store,
    settings,
)?;

// called for both rounds: the first request and the provider's callback
match flow.authenticate(&RequestContext::from_request(&req)).await? {
    FlowOutcome::Redirect(response) => {
        // send `response` (303 to the provider, with the secret cookie) back
    }
    FlowOutcome::AuthInfo(info) => {
        // the user is authenticated; call the API on their behalf
        // the preset's api_url is the account of the signed in user
        if let Some(request) = flow.api_request(&info) {
            let resp = request.send().await;
        }
    }
}
# Ok(())
# }
```
*/
mod callback;
mod client;
mod context;
mod cookie_store;
mod error;
mod flow;
mod info;
mod memory_store;
mod request;
mod secrets;
mod service;
mod settings;
mod signer;
mod token_reader;
mod token_secret;

// exposed to external program
pub use callback::resolve_callback_url;
pub use client::{Client, OAuthClientProvider};
pub use context::RequestContext;
pub use cookie_store::{CookieSecret, CookieSecretStore};
pub use error::{
    Error, Result, SecretError, SecretResult, ServiceError, ServiceResult, TokenLeg,
    TokenReaderError, TokenReaderResult,
};
pub use flow::{FlowOutcome, OAuth1Flow};
pub use info::OAuth1Info;
pub use memory_store::{InMemorySecretStore, MemorySecret};
pub use request::RequestBuilder;
pub use secrets::{Secrets, SecretsProvider};
pub use service::{OAuth1Service, ReqwestOAuth1Service};
pub use settings::{OAuth1Settings, SecretSettings};
pub use signer::{OAuthParameters, RequestSigner, Signer};
pub use token_reader::{TokenReader, TokenReaderFuture, TokenResponse};
pub use token_secret::{TokenSecret, TokenSecretStore};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `denied`, sent back by providers when the user declines.
pub const DENIED_KEY: &str = "denied";
