use thiserror::Error as ThisError;
use url::Url;

use crate::types::Credentials;

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_REALM: &str = "SMS Dungeon";
pub const DEFAULT_GATEWAY_URL: &str = "https://gatewayapi.com/rest/";

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Invalid port {value:?}: {message}")]
    InvalidPort { value: String, message: String },

    #[error("Malformed user entry {entry:?}, expected user:pass")]
    MalformedUser { entry: String },

    #[error("No users configured, set SMS_DUNGEON_USERS to a comma-separated list of user:pass")]
    NoUsers,

    #[error("Invalid realm {value:?}: quotes, backslashes and control characters are not allowed")]
    InvalidRealm { value: String },

    #[error("Invalid gateway URL {value:?}: {source}")]
    InvalidGatewayUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// One entry of the Basic auth allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicUser {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub users: Vec<BasicUser>,
    pub realm: String,
    pub gateway_url: Url,
    /// Consumer credentials used when the browser holds none.
    pub fallback_credentials: Credentials,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("SMS_DUNGEON_PORT") {
            Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidPort {
                    message: e.to_string(),
                    value,
                }
            })?,
            None => DEFAULT_PORT,
        };

        let users = parse_users(&lookup("SMS_DUNGEON_USERS").unwrap_or_default())?;
        if users.is_empty() {
            return Err(ConfigError::NoUsers);
        }

        let realm = lookup("SMS_DUNGEON_REALM")
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REALM.to_string());
        if realm.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
            return Err(ConfigError::InvalidRealm { value: realm });
        }

        let raw_url =
            lookup("SMS_DUNGEON_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        let mut gateway_url =
            Url::parse(&raw_url).map_err(|source| ConfigError::InvalidGatewayUrl {
                value: raw_url.clone(),
                source,
            })?;
        // Endpoints are joined relative to the base, which needs a trailing slash.
        if !gateway_url.path().ends_with('/') {
            let path = format!("{}/", gateway_url.path());
            gateway_url.set_path(&path);
        }

        Ok(Self {
            port,
            users,
            realm,
            gateway_url,
            fallback_credentials: Credentials {
                key: lookup("consumer_key").unwrap_or_default(),
                secret: lookup("consumer_secret").unwrap_or_default(),
            },
        })
    }
}

/// Parses `alice:secret,bob:hunter2`. Passwords may contain colons.
fn parse_users(raw: &str) -> Result<Vec<BasicUser>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((user, pass)) if !user.is_empty() => Ok(BasicUser {
                user: user.to_string(),
                pass: pass.to_string(),
            }),
            _ => Err(ConfigError::MalformedUser {
                entry: entry.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_users_are_set() {
        let config = Config::from_lookup(lookup_from(&[("SMS_DUNGEON_USERS", "alice:wonder")]))
            .unwrap();

        assert_eq!(config.port, 8787);
        assert_eq!(config.realm, "SMS Dungeon");
        assert_eq!(config.gateway_url.as_str(), DEFAULT_GATEWAY_URL);
        assert_eq!(config.fallback_credentials, Credentials::default());
        assert_eq!(
            config.users,
            vec![BasicUser {
                user: "alice".into(),
                pass: "wonder".into()
            }]
        );
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("SMS_DUNGEON_PORT", "9000"),
            ("SMS_DUNGEON_USERS", "alice:wonder:land, bob:builder"),
            ("SMS_DUNGEON_REALM", "Troll zone"),
            ("SMS_DUNGEON_GATEWAY_URL", "http://localhost:1234/rest/"),
            ("consumer_key", "ck"),
            ("consumer_secret", "cs"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].pass, "wonder:land");
        assert_eq!(config.users[1].user, "bob");
        assert_eq!(config.realm, "Troll zone");
        assert_eq!(config.gateway_url.as_str(), "http://localhost:1234/rest/");
        assert_eq!(config.fallback_credentials.key, "ck");
        assert_eq!(config.fallback_credentials.secret, "cs");
    }

    #[test]
    fn missing_users_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoUsers));

        let err = Config::from_lookup(lookup_from(&[("SMS_DUNGEON_USERS", " , ")])).unwrap_err();
        assert!(matches!(err, ConfigError::NoUsers));
    }

    #[test]
    fn malformed_user_entry_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SMS_DUNGEON_USERS", "alice:x,nocolon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedUser { entry } if entry == "nocolon"));
    }

    #[test]
    fn bad_port_and_url_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("SMS_DUNGEON_USERS", "a:b"),
            ("SMS_DUNGEON_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));

        let err = Config::from_lookup(lookup_from(&[
            ("SMS_DUNGEON_USERS", "a:b"),
            ("SMS_DUNGEON_GATEWAY_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGatewayUrl { .. }));
    }

    #[test]
    fn gateway_url_gets_a_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[
            ("SMS_DUNGEON_USERS", "a:b"),
            ("SMS_DUNGEON_GATEWAY_URL", "https://gatewayapi.com/rest"),
        ]))
        .unwrap();

        assert_eq!(config.gateway_url.as_str(), "https://gatewayapi.com/rest/");
        assert_eq!(
            config.gateway_url.join("mtsms").unwrap().as_str(),
            "https://gatewayapi.com/rest/mtsms"
        );
    }

    #[test]
    fn realm_that_cannot_be_quoted_is_rejected() {
        for realm in ["Say \"hi\"", "back\\slash", "line\nbreak"] {
            let err = Config::from_lookup(lookup_from(&[
                ("SMS_DUNGEON_USERS", "a:b"),
                ("SMS_DUNGEON_REALM", realm),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidRealm { .. }), "{realm:?}");
        }
    }
}
