use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw POST body of the form. Absent fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmitForm {
    pub receivers: String,
    #[serde(rename = "from")]
    pub sender: String,
    pub message: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_clear_cookie: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.secret.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub msisdn: String,
}

/// JSON body posted to the gateway's `mtsms` endpoint.
#[derive(Debug, Serialize)]
pub struct SmsRequest {
    pub sender: String,
    pub recipients: Vec<Recipient>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvalidReason {
    pub invalid: String,
}

/// Per-field reasons, kept in the order the gateway listed the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<(String, Vec<InvalidReason>)>);

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldErrorsVisitor;

        impl<'de> Visitor<'de> for FieldErrorsVisitor {
            type Value = FieldErrors;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to invalid reasons")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(FieldErrors(entries))
            }
        }

        deserializer.deserialize_map(FieldErrorsVisitor)
    }
}

/// Error body returned by the gateway on a non-200 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub fields: Option<FieldErrors>,
}

impl ApiErrorBody {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            fields: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.fields.as_ref().map_or(true, |f| f.0.is_empty())
    }
}
