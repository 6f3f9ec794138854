use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Any, OctetString, PrintableStringRef, SetOfVec};
use der::{Tag, Tagged};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::{KeyUsages, ToAndFromX509Extension};
use crate::cert::extensions::FlagSet;
use crate::error::{CertCryptoError, Result};
use crate::key::PublicKey;

/// Parameters for building an X.509 certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `key_usage` - Bits of the KeyUsage extension; omitted when empty.
/// * `dns_names` - DNS names for the SubjectAltName extension; omitted when empty.
/// * `extensions` - Additional X.509 extensions, appended verbatim.
#[derive(Clone, Debug, Builder)]
pub struct CertificateParams {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default)]
    pub key_usage: FlagSet<KeyUsages>,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// Distinguished name of a certificate or request subject.
///
/// ACME only ever needs the common name, so that is all this carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
}

impl DistinguishedName {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
        }
    }

    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// The common name is written as a PrintableString when every character allows it
    /// and as a UTF8String otherwise (wildcard names contain `*`).
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        let tag = if PrintableStringRef::new(&self.common_name).is_ok() {
            Tag::PrintableString
        } else {
            Tag::Utf8String
        };

        let common_name = AttributeTypeAndValue {
            oid: const_oid::db::rfc4519::CN,
            value: Any::new(tag, self.common_name.as_bytes())?,
        };
        let rdn = RelativeDistinguishedName(SetOfVec::try_from(vec![common_name])?);
        Ok(RdnSequence(vec![rdn]))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Returns `None` when the name has no common name in a string type.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Option<Self> {
        x509dn
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .filter(|attr| attr.oid == const_oid::db::rfc4519::CN)
            .find_map(|attr| match attr.value.tag() {
                Tag::PrintableString | Tag::Utf8String | Tag::Ia5String => {
                    std::str::from_utf8(attr.value.value()).ok().map(Self::new)
                }
                _ => None,
            })
    }
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// An extension with an already encoded value, e.g. the `acmeIdentifier` of TLS-ALPN-01.
    pub fn new(oid: ObjectIdentifier, critical: bool, value: impl Into<Vec<u8>>) -> Self {
        Self {
            oid,
            critical,
            value: value.into(),
        }
    }

    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        if self.oid != E::OID {
            return Err(CertCryptoError::InvalidInput(format!(
                "extension {} is not {}",
                self.oid,
                E::OID
            )));
        }
        E::from_x509_extension_value(&self.value)
    }

    pub fn to_x509_extension(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: OctetString::new(self.value.clone())?,
        })
    }

    pub fn from_x509_extension(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }
}
