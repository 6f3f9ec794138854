use std::fmt;

use crate::error::CertCryptoError;

/// Revocation status reported by an OCSP responder.
///
/// Responses are fetched and parsed elsewhere; this only classifies them. The numeric
/// values are the ones OCSP libraries conventionally use for these outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OcspStatus {
    /// The certificate is valid.
    Good = 0,
    /// The certificate has been deliberately revoked.
    Revoked = 1,
    /// The responder doesn't know about the certificate.
    Unknown = 2,
    /// The responder failed to process the request.
    ServerFailed = 3,
}

impl TryFrom<u8> for OcspStatus {
    type Error = CertCryptoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OcspStatus::Good),
            1 => Ok(OcspStatus::Revoked),
            2 => Ok(OcspStatus::Unknown),
            3 => Ok(OcspStatus::ServerFailed),
            other => Err(CertCryptoError::InvalidInput(format!(
                "unknown OCSP status {other}"
            ))),
        }
    }
}

impl fmt::Display for OcspStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OcspStatus::Good => "good",
            OcspStatus::Revoked => "revoked",
            OcspStatus::Unknown => "unknown",
            OcspStatus::ServerFailed => "server failed",
        })
    }
}
