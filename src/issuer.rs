use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::extensions::{BasicConstraints, KeyUsage, SubjectAltName};
use crate::cert::params::{CertificateParams, DistinguishedName, ExtensionParam, Validity};
use crate::cert::{self, Certificate};
use crate::error::Result;
use crate::key::PrivateKey;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &PrivateKey;

    /// Returns the serial number given to the next issued certificate.
    fn serial_number(&self) -> Vec<u8>;

    /// Issues a certificate for `cert_params`, valid over `validity`.
    ///
    /// Issued certificates are never CAs. Extensions are written in this order:
    /// BasicConstraints (critical), KeyUsage (critical, only when bits are set),
    /// SubjectAltName (only when DNS names are given), then the caller's extensions verbatim.
    fn issue(&self, cert_params: &CertificateParams, validity: Validity) -> Result<Certificate> {
        let signing_key = self.signing_key();
        let signature_algo = signing_key.signature_algorithm();

        let mut extensions: Vec<ExtensionParam> =
            vec![ExtensionParam::from_extension(BasicConstraints::default(), true)?];

        if !cert_params.key_usage.is_empty() {
            let key_usage = KeyUsage(cert_params.key_usage);
            extensions.push(ExtensionParam::from_extension(key_usage, true)?);
        }

        if !cert_params.dns_names.is_empty() {
            let san = SubjectAltName {
                names: cert_params.dns_names.clone(),
            };
            extensions.push(ExtensionParam::from_extension(san, false)?);
        }

        extensions.extend(cert_params.extensions.iter().cloned());

        let tbs_cert = TbsCertificate {
            serial_number: self.serial_number(),
            signature_algorithm: signature_algo,
            issuer: self.issuer_name(),
            not_before: validity.not_before,
            not_after: validity.not_after,
            subject: cert_params.subject.clone(),
            subject_public_key: cert_params.subject_public_key.clone(),
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let signature = signing_key.sign(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algo.into(),
            signature: cert::signature_bits(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}
