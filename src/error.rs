//! Error type shared by every module of the crate.

use thiserror::Error;

/// Represents errors that can occur while producing or reading certificate material.
///
/// Every operation in the crate either succeeds or fails with one of these variants.
/// Nothing is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertCryptoError {
    /// The requested key type is not one of the supported algorithms and sizes.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// A value handed to the PEM encoder has nothing encodable in it.
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// No PEM block could be located in the input.
    #[error("Invalid PEM: {0}")]
    InvalidPem(String),

    /// A PEM block was found but carries a different label than required.
    #[error("Unexpected PEM block type: expected {expected}, found {found}")]
    UnexpectedBlockType { expected: String, found: String },

    /// The PEM block is not a certificate request.
    #[error("PEM block is not a certificate request (found {0})")]
    NotACsr(String),

    /// A certificate payload could not be parsed.
    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    /// A certificate request payload could not be parsed.
    #[error("Malformed certificate request: {0}")]
    MalformedCsr(String),

    /// A private key payload could not be parsed.
    #[error("Malformed private key: {0}")]
    MalformedPrivateKey(String),

    /// A bundle contained no certificates.
    #[error("No certificates were found while parsing the bundle")]
    EmptyBundle,

    /// Producing a signature failed.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// A signature did not verify against the expected public key.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The system random source failed.
    #[error("Random number generator failure: {0}")]
    RngFailure(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CertCryptoError>;

impl From<der::Error> for CertCryptoError {
    /// Converts a `der::Error` into a `CertCryptoError`.
    ///
    /// Decoding paths map their errors explicitly to the matching `Malformed*` variant, so a
    /// bare `der::Error` reaching `?` comes from building a structure.
    fn from(err: der::Error) -> Self {
        CertCryptoError::EncodingError(err.to_string())
    }
}

impl From<rsa::Error> for CertCryptoError {
    fn from(err: rsa::Error) -> Self {
        CertCryptoError::KeyGeneration(err.to_string())
    }
}

impl From<pem::PemError> for CertCryptoError {
    fn from(err: pem::PemError) -> Self {
        CertCryptoError::InvalidPem(err.to_string())
    }
}
