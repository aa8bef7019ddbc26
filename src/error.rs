use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
pub type SecretResult<T> = std::result::Result<T, SecretError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

/// Failure of an `OAuth1Flow` construction or `authenticate` call.
#[derive(Error, Debug)]
pub enum Error {
    #[error("[{provider_id}] authorization was denied by the user : {reason:?}")]
    AccessDenied { provider_id: String, reason: String },
    #[error("[{provider_id}] error retrieving {leg}")]
    UnexpectedResponse {
        provider_id: String,
        leg: TokenLeg,
        #[source]
        source: ServiceError,
    },
    #[error("[{provider_id}] token secret is unavailable")]
    SecretUnavailable {
        provider_id: String,
        #[source]
        source: SecretError,
    },
    #[error("[{provider_id}] the service does not implement OAuth 1.0a, refusing to use OAuth 1.0 which is vulnerable to session fixation")]
    ConfigurationViolation { provider_id: String },
}

impl Error {
    /// Id of the provider the failed flow belongs to.
    pub fn provider_id(&self) -> &str {
        match self {
            Error::AccessDenied { provider_id, .. }
            | Error::UnexpectedResponse { provider_id, .. }
            | Error::SecretUnavailable { provider_id, .. }
            | Error::ConfigurationViolation { provider_id } => provider_id,
        }
    }
}

/// The remote leg of the handshake a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLeg {
    RequestToken,
    AccessToken,
}

impl fmt::Display for TokenLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLeg::RequestToken => f.write_str("request token"),
            TokenLeg::AccessToken => f.write_str("access token"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("provider responded with status {status} : {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("provider did not confirm the callback url (oauth_callback_confirmed is {0:?})")]
    CallbackNotConfirmed(Option<String>),
    #[error("invalid endpoint url {0} : {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("authorization url {0} can not be redirected to")]
    InvalidRedirect(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("no token secret found for provider {0}")]
    NotFound(String),
    #[error("token secret for provider {0} has expired")]
    Expired(String),
    #[error("token secret signature mismatch, the secret was tampered with")]
    InvalidSignature,
    #[error("token secret could not be decoded : {0}")]
    Malformed(String),
    #[error("token secret could not be attached to the response : {0}")]
    Publish(String),
    #[error("token secret lifetime of {0} seconds is out of range")]
    InvalidLifetime(u64),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}
