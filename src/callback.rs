use url::Url;

/// Resolve a possibly relative callback url against the inbound request.
///
/// * absolute urls (anything carrying a scheme) are returned unchanged,
/// * urls starting with `/` are relative to the request host,
/// * anything else is relative to the directory of the request path.
pub fn resolve_callback_url(callback_url: &str, secure: bool, host: &str, path: &str) -> String {
    if Url::parse(callback_url).is_ok() {
        return callback_url.to_string();
    }
    let scheme = if secure { "https" } else { "http" };
    if callback_url.starts_with('/') {
        format!("{}://{}{}", scheme, host, callback_url)
    } else {
        format!("{}://{}{}{}", scheme, host, directory_of(path), callback_url)
    }
}

// "/a/b/c" -> "/a/b/", "/a" -> "/", "" -> "/"
fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}
