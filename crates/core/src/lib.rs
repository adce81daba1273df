//! Kopilot ingestion domain layer.
//!
//! Pure logic shared by the storage, bus and HTTP crates: identifier types,
//! the error taxonomy, the [`EventSource`] enum and the per-source webhook
//! verifiers. Nothing in this crate performs I/O.

pub mod error;
pub mod secret_token;
pub mod source;
pub mod types;
pub mod zoom;

pub use error::{AuthError, CoreError};
pub use secret_token::SecretTokenVerifier;
pub use source::EventSource;
pub use zoom::{ChallengeResponse, ZoomRequest, ZoomSignatureVerifier};
