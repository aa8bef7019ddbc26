// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use reqwest::{Client as ReqwestClient, IntoUrl, Method};

use crate::{RequestSigner, Secrets, Signer};

use super::request::RequestBuilder;

/// Turns a plain `reqwest::Client` into a signing [`Client`].
pub trait OAuthClientProvider {
    fn oauth1(self, secrets: Secrets) -> Client<Signer>
    where
        Self: Sized,
    {
        self.oauth1_with_signer(Signer::new(secrets))
    }

    fn oauth1_with_signer<T>(self, signer: T) -> Client<T>
    where
        Self: Sized,
        T: RequestSigner + Clone;
}

/// A `reqwest::Client` paired with the signer applied to every request it
/// builds. `Client<()>` builds unsigned requests.
#[derive(Debug, Clone)]
pub struct Client<TSigner> {
    inner: ReqwestClient,
    signer: TSigner,
}

impl OAuthClientProvider for ReqwestClient {
    fn oauth1_with_signer<T>(self, signer: T) -> Client<T>
    where
        T: RequestSigner + Clone,
    {
        Client {
            inner: self,
            signer,
        }
    }
}

impl From<ReqwestClient> for Client<()> {
    fn from(client: ReqwestClient) -> Self {
        Client::new_with_client(client)
    }
}

impl Default for Client<()> {
    fn default() -> Self {
        Client::new()
    }
}

impl Client<()> {
    /// Constructs a new `Client`.
    ///
    /// This method calls reqwest::Client::new() internally.
    pub fn new() -> Self {
        Client::new_with_client(ReqwestClient::new())
    }

    /// Constructs a new `Client` with specifying inner `reqwest::Client`.
    pub fn new_with_client(client: ReqwestClient) -> Self {
        Client {
            inner: client,
            signer: (),
        }
    }
}

impl<T> Client<T> {
    /// Replace the signer, keeping the inner connection pool.
    pub fn with_signer<S>(self, signer: S) -> Client<S>
    where
        S: RequestSigner + Clone,
    {
        Client {
            inner: self.inner,
            signer,
        }
    }

    pub fn inner(&self) -> &ReqwestClient {
        &self.inner
    }
}

impl<T> Client<T>
where
    T: Clone,
{
    /// Convenience method to make a `GET` request to a URL.
    pub fn get<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<T> {
        self.request(Method::GET, url)
    }

    /// Convenience method to make a `POST` request to a URL.
    pub fn post<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<T> {
        self.request(Method::POST, url)
    }

    /// Start building a `Request` with the `Method` and `Url`.
    ///
    /// # Errors
    ///
    /// An unparsable url is reported when the request is sent.
    pub fn request<U: IntoUrl + Clone>(&self, method: Method, url: U) -> RequestBuilder<T> {
        let cloned_url = url.clone().into_url().ok();
        RequestBuilder::new(
            self.inner.request(method.clone(), url),
            method,
            cloned_url,
            self.signer.clone(),
        )
    }
}
