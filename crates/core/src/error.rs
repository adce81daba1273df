/// Credential failures raised by the webhook verifiers.
///
/// Every variant is the caller's fault and maps to HTTP 403. The display
/// strings are returned to the caller, so they name the failure class only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing secret")]
    MissingSecret,

    #[error("invalid secret")]
    InvalidSecret,

    #[error("missing signature headers")]
    MissingSignatureHeaders,

    #[error("invalid signature")]
    InvalidSignature,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
