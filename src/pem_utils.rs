use std::fmt;

use crate::csr::CertificateRequest;
use crate::error::{CertCryptoError, Result};
use crate::key::PrivateKey;

/// The PEM block labels this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PemLabel {
    Certificate,
    CertificateRequest,
    RsaPrivateKey,
    EcPrivateKey,
}

impl PemLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PemLabel::Certificate => "CERTIFICATE",
            PemLabel::CertificateRequest => "CERTIFICATE REQUEST",
            PemLabel::RsaPrivateKey => "RSA PRIVATE KEY",
            PemLabel::EcPrivateKey => "EC PRIVATE KEY",
        }
    }

    /// Maps a PEM tag onto a known label. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            PemLabel::Certificate,
            PemLabel::CertificateRequest,
            PemLabel::RsaPrivateKey,
            PemLabel::EcPrivateKey,
        ]
        .into_iter()
        .find(|label| label.as_str() == tag)
    }
}

impl fmt::Display for PemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw DER certificate bytes that a caller already holds, e.g. from an ACME download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerCertificateBytes(pub Vec<u8>);

impl From<Vec<u8>> for DerCertificateBytes {
    fn from(der: Vec<u8>) -> Self {
        Self(der)
    }
}

impl AsRef<[u8]> for DerCertificateBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Everything [`encode`] knows how to wrap in PEM.
#[derive(Debug, Clone, Copy)]
pub enum PemEncodable<'a> {
    /// An EC or RSA private key, written as SEC1 or PKCS#1.
    PrivateKey(&'a PrivateKey),
    /// A signed PKCS#10 request, written as its raw DER.
    CertificateRequest(&'a CertificateRequest),
    /// Certificate DER, written verbatim.
    DerCertificate(&'a DerCertificateBytes),
}

impl<'a> From<&'a PrivateKey> for PemEncodable<'a> {
    fn from(key: &'a PrivateKey) -> Self {
        PemEncodable::PrivateKey(key)
    }
}

impl<'a> From<&'a CertificateRequest> for PemEncodable<'a> {
    fn from(csr: &'a CertificateRequest) -> Self {
        PemEncodable::CertificateRequest(csr)
    }
}

impl<'a> From<&'a DerCertificateBytes> for PemEncodable<'a> {
    fn from(der: &'a DerCertificateBytes) -> Self {
        PemEncodable::DerCertificate(der)
    }
}

/// Encodes `value` as a single PEM block with LF line endings.
///
/// An empty certificate payload is refused instead of producing an empty block.
pub fn encode<'a>(value: impl Into<PemEncodable<'a>>) -> Result<String> {
    let (label, der) = match value.into() {
        PemEncodable::PrivateKey(key) => (key.pem_label(), key.to_der()?),
        PemEncodable::CertificateRequest(csr) => (PemLabel::CertificateRequest, csr.to_der()),
        PemEncodable::DerCertificate(der) => {
            if der.0.is_empty() {
                return Err(CertCryptoError::UnsupportedValueType(
                    "empty certificate DER".to_string(),
                ));
            }
            (PemLabel::Certificate, der.0.clone())
        }
    };
    log::trace!("Encoding {} byte {label} block", der.len());
    Ok(der_to_pem(&der, label.as_str()))
}

/// Decodes the first PEM block in `pem`, returning its label and payload.
pub fn decode(pem: impl AsRef<[u8]>) -> Result<(String, Vec<u8>)> {
    let block = pem::parse(pem).map_err(|e| {
        CertCryptoError::InvalidPem(format!(
            "PEM decode did not yield a valid block ({e}). Is the input in the right format?"
        ))
    })?;
    let label = block.tag().to_string();
    Ok((label, block.into_contents()))
}

/// Decodes the first PEM block and requires it to carry `expected`.
pub fn decode_expecting(pem: impl AsRef<[u8]>, expected: PemLabel) -> Result<Vec<u8>> {
    let (label, der) = decode(pem)?;
    if label != expected.as_str() {
        return Err(CertCryptoError::UnexpectedBlockType {
            expected: expected.to_string(),
            found: label,
        });
    }
    Ok(der)
}

/// Decodes a PEM `CERTIFICATE REQUEST` block into a parsed request.
pub fn decode_csr(pem: impl AsRef<[u8]>) -> Result<CertificateRequest> {
    let (label, der) = decode(pem)?;
    if label != PemLabel::CertificateRequest.as_str() {
        return Err(CertCryptoError::NotACsr(label));
    }
    CertificateRequest::from_der(&der)
}

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}
