use crate::cert::Certificate;
use crate::error::{CertCryptoError, Result};
use crate::pem_utils::PemLabel;

/// Certificates decoded from a multi-block PEM stream, in input order.
///
/// A bundle is never empty: [`parse_pem_bundle`] fails with
/// [`CertCryptoError::EmptyBundle`] instead of returning one.
#[derive(Debug, Clone)]
pub struct CertificateBundle {
    certificates: Vec<Certificate>,
}

impl CertificateBundle {
    /// The first certificate, which for an ACME chain is the end-entity certificate.
    pub fn leaf(&self) -> &Certificate {
        &self.certificates[0]
    }

    /// The certificate following the leaf, usually its issuer.
    pub fn issuer(&self) -> Option<&Certificate> {
        self.certificates.get(1)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }

    pub fn into_certificates(self) -> Vec<Certificate> {
        self.certificates
    }
}

impl IntoIterator for CertificateBundle {
    type Item = Certificate;
    type IntoIter = std::vec::IntoIter<Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.into_iter()
    }
}

impl<'a> IntoIterator for &'a CertificateBundle {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}

/// Parses a certificate bundle from top to bottom.
///
/// Every `BEGIN`/`END` pair is decoded on its own. Blocks with labels other than
/// `CERTIFICATE` are skipped, even when their body is not valid base64. A certificate block
/// whose body or payload does not decode fails the whole call with
/// [`CertCryptoError::MalformedCertificate`]; no partial bundle is returned. A trailing
/// `BEGIN` line without a matching `END` line is ignored.
pub fn parse_pem_bundle(bundle: impl AsRef<[u8]>) -> Result<CertificateBundle> {
    let mut certificates = Vec::new();
    for (index, (label, block)) in pem_blocks(bundle.as_ref()).into_iter().enumerate() {
        if label != PemLabel::Certificate.as_str() {
            log::debug!("Skipping {label} block at position {index} in bundle");
            continue;
        }

        let malformed = |msg: String| {
            CertCryptoError::MalformedCertificate(format!("block {index}: {msg}"))
        };
        let pem = pem::parse(block).map_err(|e| malformed(e.to_string()))?;
        let certificate = Certificate::from_der(pem.contents()).map_err(|e| match e {
            CertCryptoError::MalformedCertificate(msg) => malformed(msg),
            other => other,
        })?;
        certificates.push(certificate);
    }

    if certificates.is_empty() {
        return Err(CertCryptoError::EmptyBundle);
    }

    log::trace!("Parsed {} certificates from bundle", certificates.len());
    Ok(CertificateBundle { certificates })
}

const BEGIN_MARKER: &[u8] = b"-----BEGIN ";
const END_MARKER: &[u8] = b"-----END ";
const DASHES: &[u8] = b"-----";

/// Splits `input` into complete PEM blocks, each returned with its label.
fn pem_blocks(input: &[u8]) -> Vec<(String, &[u8])> {
    let mut blocks = Vec::new();
    let mut rest = input;

    while let Some(start) = find(rest, BEGIN_MARKER) {
        let block = &rest[start..];
        let after_begin = &block[BEGIN_MARKER.len()..];
        let Some(label_len) = find(after_begin, DASHES) else {
            break;
        };
        let label = &after_begin[..label_len];

        let end_line = [END_MARKER, label, DASHES].concat();
        let Some(end) = find(block, &end_line) else {
            log::debug!(
                "Ignoring unterminated {} block in bundle",
                String::from_utf8_lossy(label)
            );
            break;
        };

        let len = end + end_line.len();
        blocks.push((String::from_utf8_lossy(label).into_owned(), &block[..len]));
        rest = &block[len..];
    }

    blocks
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
