//! Shared-secret header verification (Telegram).
//!
//! Telegram echoes the `secret_token` configured with `setWebhook` back in
//! the `X-Telegram-Bot-Api-Secret-Token` header of every delivery.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// Header carrying the shared secret.
pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Compares a presented header value against the configured secret.
#[derive(Clone)]
pub struct SecretTokenVerifier {
    secret: String,
}

impl SecretTokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check the header value, if any, against the secret.
    ///
    /// A present value is compared in constant time; `subtle` short-circuits
    /// only on a length mismatch.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let presented = presented.ok_or(AuthError::MissingSecret)?;
        if presented.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        if bool::from(presented.as_bytes().ct_eq(self.secret.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidSecret)
        }
    }
}

impl fmt::Debug for SecretTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretTokenVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}
