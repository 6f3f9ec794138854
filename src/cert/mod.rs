pub mod bundle;
pub mod expiration;
pub mod extensions;
pub mod params;

use bon::Builder;
use der::asn1::{AnyRef, BitString};
use der::{Decode, Encode};
use extensions::{KeyUsages, SubjectAltName, ToAndFromX509Extension};
use params::{CertificateParams, DistinguishedName, ExtensionParam, Validity};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::{CertCryptoError, Result};
use crate::issuer::Issuer;
use crate::key::{PrivateKey, PublicKey};
use crate::pem_utils::{self, PemLabel};
use crate::tbs_certificate;

/// Common name placed in every transient self-signed certificate.
pub const SELF_SIGNED_COMMON_NAME: &str = "ACME Challenge TEMP";

/// Lifetime of a self-signed certificate when the caller gives no expiration.
pub const DEFAULT_VALIDITY_DAYS: i64 = 90;

/// Represents the supported signature algorithms for certificates and requests.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
    /// SHA-384 with ECDSA.
    Sha384WithECDSA,
}

impl From<SignatureAlgorithm> for AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RFC 4055 requires an explicit NULL parameter for the RSA algorithms; the ECDSA
    /// identifiers of RFC 5758 have none.
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRSA => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(AnyRef::NULL.into()),
            },
            SignatureAlgorithm::Sha256WithECDSA => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
                parameters: None,
            },
            SignatureAlgorithm::Sha384WithECDSA => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
                parameters: None,
            },
        }
    }
}

impl TryFrom<&AlgorithmIdentifierOwned> for SignatureAlgorithm {
    type Error = CertCryptoError;

    fn try_from(value: &AlgorithmIdentifierOwned) -> Result<Self> {
        match value.oid {
            const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION => {
                Ok(SignatureAlgorithm::Sha256WithRSA)
            }
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256 => Ok(SignatureAlgorithm::Sha256WithECDSA),
            const_oid::db::rfc5912::ECDSA_WITH_SHA_384 => Ok(SignatureAlgorithm::Sha384WithECDSA),
            other => Err(CertCryptoError::InvalidSignature(format!(
                "unsupported signature algorithm {other}"
            ))),
        }
    }
}

/// Represents a parsed X.509 certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Parses a DER encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)
            .map_err(|e| CertCryptoError::MalformedCertificate(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses the first PEM block of `pem`, which must be labelled `CERTIFICATE`.
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let der = pem_utils::decode_expecting(pem, PemLabel::Certificate)?;
        Self::from_der(&der)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertCryptoError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(
            &self.to_der()?,
            PemLabel::Certificate.as_str(),
        ))
    }

    pub fn not_before(&self) -> OffsetDateTime {
        tbs_certificate::from_x509_time(&self.inner.tbs_certificate.validity.not_before)
    }

    /// The end of the validity period (`notAfter`).
    pub fn not_after(&self) -> OffsetDateTime {
        tbs_certificate::from_x509_time(&self.inner.tbs_certificate.validity.not_after)
    }

    pub fn serial_number(&self) -> &[u8] {
        self.inner.tbs_certificate.serial_number.as_bytes()
    }

    pub fn subject(&self) -> Option<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Option<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Raw extensions in certificate order.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ExtensionParam::from_x509_extension)
            .collect()
    }

    /// DNS names of the SubjectAltName extension, empty when there is none.
    pub fn dns_names(&self) -> Result<Vec<String>> {
        self.extensions()
            .iter()
            .find(|ext| ext.oid == SubjectAltName::OID)
            .map(|ext| ext.to_extension::<SubjectAltName>().map(|san| san.names))
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// Checks that the certificate's signature was made by `issuer_key`.
    pub fn verify_signed_by(&self, issuer_key: &PublicKey) -> Result<()> {
        let tbs = self.inner.tbs_certificate.to_der()?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            CertCryptoError::InvalidSignature("signature has unused bits".to_string())
        })?;
        issuer_key.verify(&self.inner.signature_algorithm, &tbs, signature)
    }

    /// Checks that the issuer equals the subject and that the certificate verifies against
    /// its own embedded public key.
    pub fn verify_self_signed(&self) -> Result<()> {
        if self.inner.tbs_certificate.issuer != self.inner.tbs_certificate.subject {
            return Err(CertCryptoError::InvalidSignature(
                "issuer does not match subject".to_string(),
            ));
        }
        self.verify_signed_by(&self.public_key()?)
    }
}

/// Settings for a transient self-signed certificate, e.g. for TLS-ALPN-01 validation.
///
/// # Fields
/// * `domain` - The single DNS name placed in the SubjectAltName extension.
/// * `expiration` - `notAfter`; defaults to [`DEFAULT_VALIDITY_DAYS`] from now.
/// * `extensions` - Extra extensions appended verbatim after the built-in ones.
#[derive(Clone, Debug, Builder)]
pub struct SelfSignedParams {
    #[builder(into)]
    pub domain: String,
    pub expiration: Option<OffsetDateTime>,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

impl SelfSignedParams {
    /// Builds and signs the certificate with `key`, whose public half it embeds.
    ///
    /// Only RSA keys are accepted.
    pub fn generate(&self, key: &PrivateKey) -> Result<Certificate> {
        if !matches!(key, PrivateKey::Rsa { .. }) {
            return Err(CertCryptoError::UnsupportedKeyType(format!(
                "self-signed certificates need an RSA key, got {key:?}"
            )));
        }

        let mut validity = Validity::for_days(DEFAULT_VALIDITY_DAYS);
        if let Some(expiration) = self.expiration {
            validity.not_after = expiration;
        }

        let subject = DistinguishedName::new(SELF_SIGNED_COMMON_NAME);
        let self_issuer = SelfIssuer {
            name: subject.clone(),
            key,
            serial_number: tbs_certificate::random_serial_number()?,
        };

        let cert_params = CertificateParams::builder()
            .subject(subject)
            .subject_public_key(PublicKey::from_private_key(key))
            .key_usage(KeyUsages::KeyEncipherment.into())
            .dns_names(vec![self.domain.clone()])
            .extensions(self.extensions.clone())
            .build();

        log::debug!("Generating self-signed certificate for {}", self.domain);
        self_issuer.issue(&cert_params, validity)
    }
}

/// Generates a self-signed certificate for `domain` in DER form.
///
/// When `expiration` is `None` the certificate is valid for [`DEFAULT_VALIDITY_DAYS`].
pub fn generate_der_cert(
    key: &PrivateKey,
    expiration: Option<OffsetDateTime>,
    domain: &str,
    extensions: &[ExtensionParam],
) -> Result<Vec<u8>> {
    SelfSignedParams::builder()
        .domain(domain)
        .maybe_expiration(expiration)
        .extensions(extensions.to_vec())
        .build()
        .generate(key)?
        .to_der()
}

/// Generates a self-signed certificate for `domain` with the default validity, PEM encoded.
pub fn generate_pem_cert(
    key: &PrivateKey,
    domain: &str,
    extensions: &[ExtensionParam],
) -> Result<String> {
    let der = generate_der_cert(key, None, domain, extensions)?;
    Ok(pem_utils::der_to_pem(&der, PemLabel::Certificate.as_str()))
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a PrivateKey,
    serial_number: Vec<u8>,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &PrivateKey {
        self.key
    }

    fn serial_number(&self) -> Vec<u8> {
        self.serial_number.clone()
    }
}

pub(crate) fn signature_bits(signature: &[u8]) -> Result<BitString> {
    Ok(BitString::from_bytes(signature)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyType;

    #[test]
    fn test_signature_algorithm_oid_round_trip() {
        for algorithm in [
            SignatureAlgorithm::Sha256WithRSA,
            SignatureAlgorithm::Sha256WithECDSA,
            SignatureAlgorithm::Sha384WithECDSA,
        ] {
            let id: AlgorithmIdentifierOwned = algorithm.into();
            assert_eq!(SignatureAlgorithm::try_from(&id).unwrap(), algorithm);
        }
    }

    #[test]
    fn test_rsa_algorithm_has_null_parameters() {
        let id: AlgorithmIdentifierOwned = SignatureAlgorithm::Sha256WithRSA.into();
        let der = id.to_der().unwrap();
        assert!(der.ends_with(&[0x05, 0x00]));
    }

    #[test]
    fn test_self_signed_rejects_ec_keys() {
        let key = PrivateKey::generate(KeyType::Ec256).unwrap();
        let params = SelfSignedParams::builder().domain("example.com").build();
        assert!(matches!(
            params.generate(&key),
            Err(CertCryptoError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn test_from_der_rejects_garbage() {
        assert!(matches!(
            Certificate::from_der(&[0x30, 0x03, 0x02, 0x01, 0x05]),
            Err(CertCryptoError::MalformedCertificate(_))
        ));
    }
}
