use std::collections::HashMap;

use http::header::{COOKIE, HOST};
use http::{HeaderMap, Request};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// The parts of an inbound request the flow and the secret stores look at.
///
/// Built once per request by the hosting application and passed explicitly
/// through every call that needs it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    query: HashMap<String, String>,
    secure: bool,
    host: String,
    path: String,
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new<THost, TPath>(host: THost, path: TPath) -> Self
    where
        THost: Into<String>,
        TPath: Into<String>,
    {
        RequestContext {
            host: host.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Capture the context of an `http::Request`.
    ///
    /// The host is taken from the `Host` header, falling back to the uri
    /// authority. The request counts as secure when the uri scheme or the
    /// `X-Forwarded-Proto` header says https.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let uri = req.uri();
        let headers = req.headers();
        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();
        let forwarded_https = headers
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        let secure = uri.scheme_str() == Some("https") || forwarded_https;

        let mut query = HashMap::new();
        if let Some(q) = uri.query() {
            for (k, v) in url::form_urlencoded::parse(q.as_bytes()) {
                query.entry(k.into_owned()).or_insert_with(|| v.into_owned());
            }
        }

        RequestContext {
            query,
            secure,
            host,
            path: uri.path().to_string(),
            headers: headers.clone(),
        }
    }

    pub fn secure(self, secure: bool) -> Self {
        RequestContext { secure, ..self }
    }

    pub fn query_param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn headers(self, headers: HeaderMap) -> Self {
        RequestContext { headers, ..self }
    }

    /// First value of a query parameter. Present-but-empty parameters
    /// yield `Some("")`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of the named cookie sent with the request.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| {
                let mut kv = pair.trim().splitn(2, '=');
                Some((kv.next()?, kv.next()?))
            })
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn from_http_request() {
        let req = Request::builder()
            .uri("/auth/twitter?oauth_token=t&oauth_verifier=v%20w&denied")
            .header(HOST, "www.example.com")
            .header(FORWARDED_PROTO, "https")
            .header(COOKIE, "a=1; OAuth1TokenSecret=abc.def")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host(), "www.example.com");
        assert_eq!(ctx.path(), "/auth/twitter");
        assert!(ctx.is_secure());
        assert_eq!(ctx.query("oauth_token"), Some("t"));
        assert_eq!(ctx.query("oauth_verifier"), Some("v w"));
        assert_eq!(ctx.query("denied"), Some(""));
        assert_eq!(ctx.query("missing"), None);
        assert_eq!(ctx.cookie("OAuth1TokenSecret"), Some("abc.def"));
        assert_eq!(ctx.cookie("b"), None);
    }

    #[test]
    fn host_from_absolute_uri() {
        let req = Request::builder()
            .uri("http://api.example.com:8080/cb")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host(), "api.example.com:8080");
        assert!(!ctx.is_secure());
    }

    #[test]
    fn cookies_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));
        let ctx = RequestContext::new("h", "/").headers(headers);
        assert_eq!(ctx.cookie("b"), Some("2"));
    }
}
