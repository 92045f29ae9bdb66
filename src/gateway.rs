use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::GatewayError;
use crate::oauth;
use crate::types::{ApiErrorBody, Credentials, SmsRequest};

const MTSMS_ENDPOINT: &str = "mtsms";

/// Client for the GatewayAPI REST interface.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    endpoint: Url,
}

impl GatewayClient {
    pub fn new(base_url: &Url) -> Result<Self, GatewayError> {
        let endpoint = base_url.join(MTSMS_ENDPOINT)?;
        let client = Client::builder().build()?;

        Ok(Self { client, endpoint })
    }

    /// Sends one SMS. Only an HTTP 200 counts as success; there is no retry.
    pub async fn send_sms(
        &self,
        credentials: &Credentials,
        sms: &SmsRequest,
    ) -> Result<(), GatewayError> {
        let authorization = oauth::authorization_header("POST", &self.endpoint, credentials)?;

        info!(
            "Sending SMS from {} to {} recipient(s)",
            sms.sender,
            sms.recipients.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .json(sms)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::OK {
            debug!("Gateway accepted SMS: {}", text);
            return Ok(());
        }

        let code = status.as_u16();
        warn!("Gateway rejected SMS with HTTP {}: {}", code, text);

        let body = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) if !body.is_empty() => body,
            _ if text.trim().is_empty() => ApiErrorBody::from_message(format!("HTTP {code}")),
            _ => ApiErrorBody::from_message(format!("HTTP {code} - {}", text.trim())),
        };

        Err(GatewayError::Rejected { status: code, body })
    }
}
