// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio implementation of the CarrierProvider trait.
//!
//! Signature verification follows Twilio's canonicalization: the exact
//! configured callback URL concatenated with every form parameter as
//! `key` + `value`, keys sorted, HMAC-SHA1 signed with the auth token and
//! base64 encoded.

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;
use tracing::{debug, warn};

use pawline_core::traits::{CarrierProvider, SendReceipt};
use pawline_core::types::DeliveryStatus;
use pawline_core::PawlineError;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Twilio carrier configuration.
///
/// Mirrors `CarrierConfig` from `pawline-config` to avoid a dependency on
/// the config crate from the carrier crate.
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    /// Account SID; `None` disables outbound sends.
    pub account_sid: Option<String>,
    /// Auth token; `None` skips webhook verification (development only).
    pub auth_token: Option<String>,
}

/// Twilio-backed carrier provider.
pub struct TwilioCarrier {
    config: TwilioConfig,
    http: reqwest::Client,
    api_base: String,
}

impl TwilioCarrier {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the Messages API at a different base URL (tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Compute the expected signature for a payload. Exposed for tests and
    /// local webhook simulation.
    pub fn compute_signature(auth_token: &str, url: &str, raw_body: &str) -> Option<String> {
        let params: Vec<(String, String)> = serde_urlencoded::from_str(raw_body).ok()?;
        let mut sorted = params;
        sorted.sort();

        let mut data = url.to_string();
        for (key, value) in &sorted {
            data.push_str(key);
            data.push_str(value);
        }

        let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
        mac.update(data.as_bytes());
        Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: Option<String>,
}

fn map_delivery_status(status: Option<&str>) -> DeliveryStatus {
    match status {
        Some("queued") | Some("accepted") => DeliveryStatus::Queued,
        Some("sent") => DeliveryStatus::Sent,
        Some("delivered") => DeliveryStatus::Delivered,
        // Unknown statuses are treated as failures, matching callbacks.
        Some(_) | None => DeliveryStatus::Failed,
    }
}

#[async_trait]
impl CarrierProvider for TwilioCarrier {
    fn verify_signature(&self, raw_body: &str, signature: &str, url: &str) -> bool {
        let Some(ref auth_token) = self.config.auth_token else {
            warn!("carrier auth token not configured, skipping webhook verification");
            return true;
        };
        if signature.is_empty() {
            warn!("no signature header on inbound webhook");
            return false;
        }

        match Self::compute_signature(auth_token, url, raw_body) {
            Some(expected) => expected == signature,
            None => false,
        }
    }

    async fn send(
        &self,
        from_e164: &str,
        to_e164: &str,
        body: &str,
        correlation_id: &str,
    ) -> Result<SendReceipt, PawlineError> {
        let (Some(account_sid), Some(auth_token)) =
            (&self.config.account_sid, &self.config.auth_token)
        else {
            return Err(PawlineError::Carrier {
                message: "carrier credentials not configured".into(),
                source: None,
            });
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        );
        let response = self
            .http
            .post(&url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", to_e164), ("From", from_e164), ("Body", body)])
            .send()
            .await
            .map_err(|e| PawlineError::Carrier {
                message: format!("send request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PawlineError::Carrier {
                message: format!("send rejected with {status}: {detail}"),
                source: None,
            });
        }

        let resource: MessageResource =
            response.json().await.map_err(|e| PawlineError::Carrier {
                message: format!("malformed send response: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(
            correlation_id,
            provider_message_sid = %resource.sid,
            "outbound message handed to carrier"
        );
        Ok(SendReceipt {
            delivery_status: map_delivery_status(resource.status.as_deref()),
            provider_message_sid: resource.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://hooks.example.com/webhooks/sms";
    const BODY: &str = "From=%2B15550001111&To=%2B15550002222&Body=YES&MessageSid=SM1";

    fn carrier(auth_token: Option<&str>) -> TwilioCarrier {
        TwilioCarrier::new(TwilioConfig {
            account_sid: Some("AC123".into()),
            auth_token: auth_token.map(str::to_string),
        })
    }

    #[test]
    fn valid_signature_verifies() {
        let c = carrier(Some("token-1"));
        let sig = TwilioCarrier::compute_signature("token-1", URL, BODY).unwrap();
        assert!(c.verify_signature(BODY, &sig, URL));
    }

    #[test]
    fn wrong_token_fails_verification() {
        let c = carrier(Some("token-1"));
        let sig = TwilioCarrier::compute_signature("other-token", URL, BODY).unwrap();
        assert!(!c.verify_signature(BODY, &sig, URL));
    }

    #[test]
    fn tampered_body_fails_verification() {
        let c = carrier(Some("token-1"));
        let sig = TwilioCarrier::compute_signature("token-1", URL, BODY).unwrap();
        let tampered = BODY.replace("YES", "NO");
        assert!(!c.verify_signature(&tampered, &sig, URL));
    }

    #[test]
    fn parameter_order_does_not_affect_the_signature() {
        // Canonicalization sorts keys, so the wire order is irrelevant.
        let reordered = "MessageSid=SM1&Body=YES&To=%2B15550002222&From=%2B15550001111";
        let a = TwilioCarrier::compute_signature("token-1", URL, BODY).unwrap();
        let b = TwilioCarrier::compute_signature("token-1", URL, reordered).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn url_is_part_of_the_signed_data() {
        let a = TwilioCarrier::compute_signature("token-1", URL, BODY).unwrap();
        let b =
            TwilioCarrier::compute_signature("token-1", "https://evil.example.com/x", BODY)
                .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn missing_signature_header_is_rejected() {
        let c = carrier(Some("token-1"));
        assert!(!c.verify_signature(BODY, "", URL));
    }

    #[test]
    fn unconfigured_token_skips_verification() {
        let c = carrier(None);
        assert!(c.verify_signature(BODY, "anything", URL));
    }

    #[tokio::test]
    async fn send_posts_form_and_parses_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(body_string_contains("To=%2B15550002222"))
            .and(body_string_contains("Body=Your+sitter+is+on+the+way"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM900",
                "status": "queued",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let c = carrier(Some("token-1")).with_api_base(server.uri());
        let receipt = c
            .send("+15550001111", "+15550002222", "Your sitter is on the way", "corr-1")
            .await
            .unwrap();
        assert_eq!(receipt.provider_message_sid, "SM900");
        assert_eq!(receipt.delivery_status, DeliveryStatus::Queued);
    }

    #[tokio::test]
    async fn send_surfaces_carrier_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid To number"))
            .mount(&server)
            .await;

        let c = carrier(Some("token-1")).with_api_base(server.uri());
        let err = c
            .send("+15550001111", "not-a-number", "hi", "corr-2")
            .await
            .unwrap_err();
        assert!(matches!(err, PawlineError::Carrier { .. }));
        assert!(err.to_string().contains("send rejected"));
    }

    #[tokio::test]
    async fn send_without_credentials_fails_fast() {
        let c = TwilioCarrier::new(TwilioConfig::default());
        let err = c
            .send("+15550001111", "+15550002222", "hi", "corr-3")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("credentials not configured"));
    }
}
