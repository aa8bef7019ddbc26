// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use std::{convert::TryFrom, future::Future, time::Duration};

use http::{header::AUTHORIZATION, Method};
use reqwest::{
    header::HeaderName, header::HeaderValue, Error, RequestBuilder as ReqwestRequestBuilder,
    Response, Url,
};
use serde::Serialize;

use crate::RequestSigner;

/// A request that is signed with `TSigner` right before it is sent.
///
/// Keeps a copy of the url and the form body, the two parts of a request that
/// take part in the OAuth signature base string.
pub struct RequestBuilder<TSigner>
where
    TSigner: Clone,
{
    method: Method,
    inner: ReqwestRequestBuilder,
    signer: TSigner,
    url: Option<Url>,
    body: String,
}

impl RequestBuilder<()> {
    /// Attach the signer.
    pub fn sign<T>(self, signer: T) -> RequestBuilder<T>
    where
        T: RequestSigner + Clone,
    {
        RequestBuilder {
            inner: self.inner,
            method: self.method,
            url: self.url,
            body: self.body,
            signer,
        }
    }
}

impl<TSigner> RequestBuilder<TSigner>
where
    TSigner: RequestSigner + Clone,
{
    /// Sign the request and send it, returning a future Response.
    ///
    /// # Errors
    ///
    /// This method fails if there was an error while sending request,
    /// redirect loop was detected or redirect limit was exhausted.
    pub fn send(self) -> impl Future<Output = Result<Response, Error>> {
        self.generate_signature().send()
    }

    /// Generate an OAuth signature and return the reqwest's `RequestBuilder`.
    pub fn generate_signature(self) -> ReqwestRequestBuilder {
        let url = match self.url {
            Some(url) => url,
            // reqwest reports the unparsable url when the request is sent
            None => return self.inner,
        };
        let signature = match url.query() {
            None | Some("") => {
                self.signer
                    .authorization(&self.method, url.clone(), &self.body, false)
            }
            Some(q) => {
                let mut pure_url = url.clone();
                pure_url.set_query(None);
                self.signer.authorization(&self.method, pure_url, q, true)
            }
        };
        self.inner.header(AUTHORIZATION, signature)
    }
}

impl<TSigner> RequestBuilder<TSigner>
where
    TSigner: Clone,
{
    pub(crate) fn new(
        builder: ReqwestRequestBuilder,
        method: Method,
        url: Option<Url>,
        signer: TSigner,
    ) -> Self {
        RequestBuilder {
            inner: builder,
            method,
            url,
            body: String::new(),
            signer,
        }
    }

    /// Modify the query string of the URL.
    ///
    /// Appends the parameters provided; existing keys are not overwritten.
    ///
    /// # Errors
    /// This method will fail if the object you provide cannot be serialized
    /// into a query string.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        if let Some(ref mut url) = self.url {
            let mut pairs = url.query_pairs_mut();
            let serializer = serde_urlencoded::Serializer::new(&mut pairs);

            let _ = query.serialize(serializer);
        }
        if let Some(ref mut url) = self.url {
            if let Some("") = url.query() {
                url.set_query(None);
            }
        }
        self.inner = self.inner.query(query);
        self
    }

    /// Send a form body.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        if let Ok(body) = serde_urlencoded::to_string(form) {
            self.body = body;
        }
        self.inner = self.inner.form(form);
        self
    }

    /// Add a `Header` to this Request.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.inner = self.inner.header(key, value);
        self
    }

    /// Enables a request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }
}
