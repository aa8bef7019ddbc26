use std::borrow::Cow;

use http::Method;
use oauth1_request::signature_method::SignatureMethod;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use url::Url;

use crate::{Secrets, SecretsProvider};

const OAUTH_IDENTIFIER: &str = "oauth_";
const REALM_IDENTIFIER: &str = "realm";

/// Produces the `Authorization` header value of an outgoing request.
///
/// `payload` is the url-encoded query (when `is_url_query`) or form body the
/// request carries; it takes part in the signature base string.
pub trait RequestSigner {
    fn authorization(&self, method: &Method, url: Url, payload: &str, is_url_query: bool)
        -> String;
}

/// Signs requests with a set of [`Secrets`] per OAuth 1.0a.
#[derive(Debug, Clone)]
pub struct Signer<TSignatureMethod = HmacSha1>
where
    TSignatureMethod: SignatureMethod + Clone,
{
    secrets: Secrets,
    parameters: OAuthParameters<'static, TSignatureMethod>,
}

impl Signer<HmacSha1> {
    pub fn new(secrets: Secrets) -> Self {
        Signer::with_params(secrets, OAuthParameters::new())
    }
}

impl<TSignatureMethod> Signer<TSignatureMethod>
where
    TSignatureMethod: SignatureMethod + Clone,
{
    pub fn with_params(
        secrets: Secrets,
        parameters: OAuthParameters<'static, TSignatureMethod>,
    ) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    pub fn secrets(&self) -> &Secrets {
        &self.secrets
    }
}

impl<TSignatureMethod> RequestSigner for Signer<TSignatureMethod>
where
    TSignatureMethod: SignatureMethod + Clone,
{
    fn authorization(
        &self,
        method: &Method,
        url: Url,
        payload: &str,
        is_url_query: bool,
    ) -> String {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();
        let options = self.parameters.build_options(token);

        // sort the payload together with a marker that separates the keys
        // preceding the oauth_* block from the ones following it
        let mut sorted_query: Vec<(Cow<str>, Cow<str>)> =
            url::form_urlencoded::parse(payload.as_bytes()).collect();
        sorted_query.push((Cow::from(OAUTH_IDENTIFIER), Cow::from("")));
        sorted_query.sort();
        let marker = sorted_query
            .iter()
            .position(|(k, _)| k == OAUTH_IDENTIFIER)
            .unwrap_or(sorted_query.len());
        let query_before_oauth = &sorted_query[..marker];
        let query_after_oauth = sorted_query.get(marker + 1..).unwrap_or_default();

        let sig_method = self.parameters.signature_method.clone();
        let mut signer = if is_url_query {
            OAuthSigner::with_signature_method(
                sig_method,
                method.as_str(),
                url,
                consumer_secret,
                token_secret,
            )
        } else {
            OAuthSigner::form_with_signature_method(
                sig_method,
                method.as_str(),
                url,
                consumer_secret,
                token_secret,
            )
        };

        // parameters must be fed in ascending key order,
        // the oauth_* parameters are added as one block
        for (key, value) in query_before_oauth {
            if !key.starts_with(OAUTH_IDENTIFIER) {
                signer.parameter(key, value);
            }
        }
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        for (key, value) in query_after_oauth {
            if !key.starts_with(OAUTH_IDENTIFIER) {
                signer.parameter(key, value);
            }
        }

        let sign = signer.finish().authorization;
        match self.parameters.realm {
            Some(ref realm) => format!("{},{}=\"{}\"", sign, REALM_IDENTIFIER, realm),
            None => sign,
        }
    }
}

/// Optional `oauth_*` protocol parameters attached to a signature.
#[derive(Debug, Clone)]
pub struct OAuthParameters<'a, TSignatureMethod>
where
    TSignatureMethod: SignatureMethod + Clone,
{
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    signature_method: TSignatureMethod,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
}

impl Default for OAuthParameters<'static, HmacSha1> {
    fn default() -> Self {
        OAuthParameters {
            callback: None,
            nonce: None,
            realm: None,
            signature_method: HmacSha1,
            timestamp: None,
            verifier: None,
            version: false,
        }
    }
}

impl OAuthParameters<'static, HmacSha1> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<'a, T> OAuthParameters<'a, T>
where
    T: SignatureMethod + Clone,
{
    /// set the oauth_callback value, sent on the request token leg
    pub fn callback<V>(self, callback: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    pub fn nonce<V>(self, nonce: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    pub fn realm<V>(self, realm: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    pub fn timestamp<V>(self, timestamp: V) -> Self
    where
        V: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value, sent on the access token leg
    pub fn verifier<V>(self, verifier: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// When `true`, oauth_version is sent as "1.0"; otherwise it is omitted.
    pub fn version<V>(self, version: V) -> Self
    where
        V: Into<bool>,
    {
        OAuthParameters {
            version: version.into(),
            ..self
        }
    }

    pub fn signature_method<TSignatureMethod>(
        self,
        signature_method: TSignatureMethod,
    ) -> OAuthParameters<'a, TSignatureMethod>
    where
        TSignatureMethod: SignatureMethod + Clone,
    {
        OAuthParameters {
            signature_method,
            callback: self.callback,
            nonce: self.nonce,
            realm: self.realm,
            timestamp: self.timestamp,
            verifier: self.verifier,
            version: self.version,
        }
    }

    fn build_options<'b>(&'b self, token: Option<&'b str>) -> Options<'b> {
        let mut opt = Options::new();

        // NOTE: items must be added by alphabetical order
        if let Some(ref callback) = self.callback {
            opt.callback(callback.as_ref());
        }
        if let Some(ref nonce) = self.nonce {
            opt.nonce(nonce.as_ref());
        }
        if let Some(timestamp) = self.timestamp {
            opt.timestamp(timestamp);
        }
        if let Some(token) = token {
            opt.token(token);
        }
        if let Some(ref verifier) = self.verifier {
            opt.verifier(verifier.as_ref());
        }
        opt.version(self.version);

        opt
    }
}
