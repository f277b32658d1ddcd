//! Zoom webhook signature validation (`x-zm-signature`, scheme `v0`).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;

use super::WebhookValidator;
use crate::error::{webhook_error, Error, WebhookErrorKind};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying `v0=<hex signature>`.
pub const SIGNATURE_HEADER: &str = "x-zm-signature";
/// Header carrying the request timestamp in epoch seconds.
pub const TIMESTAMP_HEADER: &str = "x-zm-request-timestamp";

const SIGNATURE_VERSION: &str = "v0";

/// Response to Zoom's `endpoint.url_validation` challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlValidationResponse {
    pub plain_token: String,
    pub encrypted_token: String,
}

/// Zoom webhook validator.
///
/// The signed message is `v0:{timestamp}:{body}`, keyed with the app's webhook
/// secret token. Requests whose timestamp is further than `tolerance` from now
/// are rejected to limit replays.
pub struct ZoomSignatureValidator {
    secret_token: SecretString,
    tolerance: Duration,
}

impl ZoomSignatureValidator {
    /// Create a new validator with a 5 minute timestamp tolerance.
    ///
    /// # Arguments
    ///
    /// * `secret_token` - Webhook secret token from the Zoom app configuration
    pub fn new(secret_token: SecretString) -> Self {
        Self {
            secret_token,
            tolerance: Duration::minutes(5),
        }
    }

    /// Set the accepted timestamp skew.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Compute the `x-zm-signature` value for a timestamp and body.
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> Result<String, Error> {
        let mut mac = self.mac()?;
        mac.update(format!("{}:{}:", SIGNATURE_VERSION, timestamp).as_bytes());
        mac.update(body);
        Ok(format!(
            "{}={}",
            SIGNATURE_VERSION,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    /// Answer an `endpoint.url_validation` challenge.
    pub fn encrypt_plain_token(&self, plain_token: &str) -> Result<UrlValidationResponse, Error> {
        let mut mac = self.mac()?;
        mac.update(plain_token.as_bytes());
        Ok(UrlValidationResponse {
            plain_token: plain_token.to_string(),
            encrypted_token: hex::encode(mac.finalize().into_bytes()),
        })
    }

    /// Validate a request against a fixed "now".
    pub fn validate_at(
        &self,
        headers: &HashMap<String, String>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let signature = header_value(headers, SIGNATURE_HEADER).ok_or_else(|| {
            webhook_error(
                WebhookErrorKind::MissingSignature,
                &format!("Missing signature header: {}", SIGNATURE_HEADER),
            )
        })?;

        let timestamp = header_value(headers, TIMESTAMP_HEADER)
            .ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::MissingTimestamp,
                    &format!("Missing timestamp header: {}", TIMESTAMP_HEADER),
                )
            })?
            .trim()
            .parse::<i64>()
            .map_err(|_| {
                webhook_error(WebhookErrorKind::InvalidPayload, "Invalid timestamp format")
            })?;

        let skew = now.timestamp().abs_diff(timestamp);
        if skew > self.tolerance.num_seconds().unsigned_abs() {
            return Err(webhook_error(
                WebhookErrorKind::TimestampExpired,
                &format!("Request timestamp is {}s away from now", skew),
            ));
        }

        let expected_sig = signature
            .strip_prefix("v0=")
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or_else(|| {
                webhook_error(WebhookErrorKind::InvalidSignature, "Invalid signature format")
            })?;

        let mut mac = self.mac()?;
        mac.update(format!("{}:{}:", SIGNATURE_VERSION, timestamp).as_bytes());
        mac.update(body);

        Ok(mac.verify_slice(&expected_sig).is_ok())
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(self.secret_token.expose_secret().as_bytes())
            .map_err(|_| webhook_error(WebhookErrorKind::InvalidPayload, "Invalid HMAC key"))
    }
}

impl WebhookValidator for ZoomSignatureValidator {
    fn validate(&self, headers: &HashMap<String, String>, body: &[u8]) -> Result<bool, Error> {
        self.validate_at(headers, body, Utc::now())
    }

    fn provider_id(&self) -> &str {
        "zoom"
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
