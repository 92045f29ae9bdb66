use std::collections::HashMap;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};

/// Prefix shared by every cookie this app writes.
pub const COOKIE_PREFIX: &str = "apekatt_";

const THIRTY_DAYS_SECS: u64 = 86_400 * 30;
const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Cookies sent by the browser plus the `Set-Cookie` directives queued for
/// the response. Writes never affect what `get` returns within a request.
#[derive(Debug, Default)]
pub struct CookieJar {
    incoming: HashMap<String, String>,
    outgoing: Vec<String>,
}

impl CookieJar {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| {
                let value = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                (name.to_string(), value)
            })
            .collect();

        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// Value of the prefixed cookie `key`, if the browser sent one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.incoming
            .get(&format!("{COOKIE_PREFIX}{key}"))
            .map(String::as_str)
    }

    /// Stores `value` under the prefixed `key` for thirty days.
    pub fn store(&mut self, key: &str, value: &str) {
        self.outgoing.push(format!(
            "{COOKIE_PREFIX}{key}={}; Max-Age={THIRTY_DAYS_SECS}; Path=/",
            urlencoding::encode(value)
        ));
    }

    /// Blanks the prefixed `key` and expires it immediately.
    pub fn expire(&mut self, key: &str) {
        self.outgoing.push(format!(
            "{COOKIE_PREFIX}{key}=; Expires={EXPIRED_DATE}; Max-Age=0; Path=/"
        ));
    }

    pub fn set_cookie_headers(&self) -> Result<HeaderMap, axum::http::header::InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        for directive in &self.outgoing {
            headers.append(SET_COOKIE, HeaderValue::from_str(directive)?);
        }
        Ok(headers)
    }
}
