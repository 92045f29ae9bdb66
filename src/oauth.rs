//! OAuth 1.0a one-legged request signing (HMAC-SHA1, consumer key and secret
//! only, no token).

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::types::Credentials;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Builds the `Authorization` header value for a request with a fresh nonce
/// and the current timestamp.
pub fn authorization_header(
    method: &str,
    url: &Url,
    credentials: &Credentials,
) -> Result<String, GatewayError> {
    let nonce = Uuid::new_v4().simple().to_string();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    signed_header(method, url, credentials, &nonce, timestamp)
}

fn signed_header(
    method: &str,
    url: &Url,
    credentials: &Credentials,
    nonce: &str,
    timestamp: u64,
) -> Result<String, GatewayError> {
    let timestamp = timestamp.to_string();
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_version", OAUTH_VERSION),
    ];

    let signature = sign(method, url, &oauth_params, &credentials.secret)?;
    oauth_params.push(("oauth_signature", signature.as_str()));

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {fields}"))
}

fn sign(
    method: &str,
    url: &Url,
    oauth_params: &[(&str, &str)],
    consumer_secret: &str,
) -> Result<String, GatewayError> {
    let base = signature_base_string(method, url, oauth_params);
    // Token secret is always empty for one-legged requests.
    let key = format!("{}&", encode(consumer_secret));

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| GatewayError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn signature_base_string(method: &str, url: &Url, oauth_params: &[(&str, &str)]) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    params.sort();

    let normalized = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&normalized)
    )
}

/// Scheme, authority and path, without query or fragment. `Url` already
/// lowercases the host and drops default ports.
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// RFC 3986 percent-encoding, leaving only `ALPHA / DIGIT / - . _ ~`.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
