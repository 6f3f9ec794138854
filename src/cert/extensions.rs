use const_oid::AssociatedOid;
use der::{Decode, Encode, asn1::Ia5String, oid::ObjectIdentifier};
use x509_cert::ext::pkix::name::GeneralName;

use crate::error::CertCryptoError;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use certcrypto::cert::extensions::SubjectAltName;
/// use certcrypto::cert::extensions::ToAndFromX509Extension;
/// let san = SubjectAltName { names: vec!["example.com".to_string()] };
/// let encoded = san.to_x509_extension_value().unwrap();
/// let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(san.names, decoded.names);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCryptoError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCryptoError>
    where
        Self: Sized;
}

fn malformed_extension(err: der::Error) -> CertCryptoError {
    CertCryptoError::InvalidInput(format!("malformed extension value: {err}"))
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// Only DNS names are produced; other general name forms are ignored when decoding.
///
/// # Fields
/// * `names` - A list of DNS names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAltName {
    pub names: Vec<String>,
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCryptoError> {
        let san = x509_cert::ext::pkix::SubjectAltName(
            self.names
                .iter()
                .map(|name| {
                    Ia5String::new(name)
                        .map(GeneralName::DnsName)
                        .map_err(|e| CertCryptoError::InvalidInput(format!("{name}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?,
        );

        Ok(san.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCryptoError> {
        let san =
            x509_cert::ext::pkix::SubjectAltName::from_der(extension).map_err(malformed_extension)?;
        let names = san
            .0
            .iter()
            .filter_map(|name| match name {
                GeneralName::DnsName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect();
        Ok(Self { names })
    }
}

/// Represents the Basic Constraints extension.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCryptoError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, CertCryptoError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)
            .map_err(malformed_extension)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCryptoError> {
        let ku = X509KeyUsage::from(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCryptoError> {
        let ku = X509KeyUsage::from_der(extension).map_err(malformed_extension)?;
        Ok(Self(ku.0))
    }
}

/// `id-pe-tlsfeature` from RFC 7633.
pub const TLS_FEATURE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.1.24");

/// DER value of a TLS Feature extension requesting `status_request`: the OCSP must-staple flag.
pub const OCSP_MUST_STAPLE_FEATURE: [u8; 5] = [0x30, 0x03, 0x02, 0x01, 0x05];

/// Represents the TLS Feature extension (RFC 7633).
///
/// A sequence of TLS extension numbers the certificate holder promises to negotiate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFeature {
    pub features: Vec<u16>,
}

impl TlsFeature {
    /// TLS `status_request` extension number.
    pub const STATUS_REQUEST: u16 = 5;

    pub fn must_staple() -> Self {
        Self {
            features: vec![Self::STATUS_REQUEST],
        }
    }

    pub fn is_must_staple(&self) -> bool {
        self.features.contains(&Self::STATUS_REQUEST)
    }
}

impl ToAndFromX509Extension for TlsFeature {
    const OID: ObjectIdentifier = TLS_FEATURE_OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCryptoError> {
        Ok(self.features.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCryptoError> {
        let features = Vec::<u16>::from_der(extension).map_err(malformed_extension)?;
        Ok(Self { features })
    }
}
