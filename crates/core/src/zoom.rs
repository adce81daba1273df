//! Zoom webhook authentication.
//!
//! Zoom uses one endpoint for two unrelated exchanges:
//!
//! - **URL validation**: Zoom posts an `endpoint.url_validation` event with a
//!   `plainToken`; the receiver proves it holds the secret token by replying
//!   with `HMAC-SHA256(secret, plainToken)`. Nothing is stored.
//! - **Signed events**: every other delivery carries `x-zm-signature` and
//!   `x-zm-request-timestamp`. The signature is
//!   `v0=hex(HMAC-SHA256(secret, "v0:{timestamp}:{raw body}"))`.
//!
//! The signature covers the raw request bytes, so verification must run on
//! the untouched body and never on a re-serialized copy.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AuthError, CoreError};

pub const SIGNATURE_HEADER: &str = "x-zm-signature";
pub const TIMESTAMP_HEADER: &str = "x-zm-request-timestamp";

/// Event name Zoom uses for the endpoint ownership challenge.
pub const URL_VALIDATION_EVENT: &str = "endpoint.url_validation";

const SIGNATURE_VERSION: &str = "v0";

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Request classification
// ---------------------------------------------------------------------------

/// The two request shapes accepted on the Zoom endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoomRequest {
    /// Ownership challenge; answered directly, never persisted.
    UrlValidation { plain_token: String },
    /// Regular event; requires a valid signature before it is stored.
    SignedEvent { event: Option<String> },
}

impl ZoomRequest {
    /// Decide which exchange a parsed body belongs to.
    ///
    /// A validation event without a string `payload.plainToken` is rejected
    /// as a validation error rather than falling through to signature
    /// checking.
    pub fn classify(body: &serde_json::Value) -> Result<Self, CoreError> {
        let event = body.get("event").and_then(serde_json::Value::as_str);

        if event == Some(URL_VALIDATION_EVENT) {
            let plain_token = body
                .get("payload")
                .and_then(|payload| payload.get("plainToken"))
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| CoreError::Validation("missing plainToken".into()))?;

            return Ok(Self::UrlValidation {
                plain_token: plain_token.to_string(),
            });
        }

        Ok(Self::SignedEvent {
            event: event.map(str::to_string),
        })
    }
}

// ---------------------------------------------------------------------------
// Challenge response
// ---------------------------------------------------------------------------

/// Reply body for a URL validation challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeResponse {
    #[serde(rename = "plainToken")]
    pub plain_token: String,
    #[serde(rename = "encryptedToken")]
    pub encrypted_token: String,
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

/// Signs challenges and verifies event signatures with the Zoom secret token.
#[derive(Clone)]
pub struct ZoomSignatureVerifier {
    secret: String,
}

impl ZoomSignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Answer a URL validation challenge.
    pub fn challenge_response(&self, plain_token: &str) -> ChallengeResponse {
        ChallengeResponse {
            plain_token: plain_token.to_string(),
            encrypted_token: self.hmac_hex(&[plain_token.as_bytes()]),
        }
    }

    /// Expected `x-zm-signature` value for a timestamp and raw body.
    pub fn sign(&self, timestamp: &str, raw_body: &[u8]) -> String {
        let digest = self.hmac_hex(&[
            SIGNATURE_VERSION.as_bytes(),
            b":",
            timestamp.as_bytes(),
            b":",
            raw_body,
        ]);
        format!("{SIGNATURE_VERSION}={digest}")
    }

    /// Verify a signed event delivery.
    ///
    /// Both headers must be present; the presented signature is compared
    /// against the expected one in constant time.
    pub fn verify(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        raw_body: &[u8],
    ) -> Result<(), AuthError> {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return Err(AuthError::MissingSignatureHeaders);
        };

        let expected = self.sign(timestamp, raw_body);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }

    fn hmac_hex(&self, parts: &[&[u8]]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key length");
        for part in parts {
            mac.update(part);
        }
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for ZoomSignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomSignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
