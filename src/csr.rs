//! PKCS#10 certificate signing requests for ACME order finalization.

use bon::Builder;
use const_oid::AssociatedOid;
use der::asn1::{Any, SetOfVec};
use der::{Decode, Encode};
use x509_cert::attr::Attribute;
use x509_cert::request::{CertReq, CertReqInfo, ExtensionReq, Version};

use crate::cert::extensions::{SubjectAltName, TlsFeature, ToAndFromX509Extension};
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::cert::{self, SignatureAlgorithm};
use crate::error::{CertCryptoError, Result};
use crate::key::{PrivateKey, PublicKey};

/// What goes into a certificate signing request.
///
/// # Fields
/// * `common_name` - Subject common name, normally the primary domain of the order.
/// * `san` - DNS names for the SubjectAltName extension, kept in the given order.
/// * `must_staple` - Request the OCSP must-staple TLS feature (RFC 7633).
#[derive(Clone, Debug, Builder)]
pub struct CsrParams {
    #[builder(into)]
    pub common_name: String,
    #[builder(default)]
    pub san: Vec<String>,
    #[builder(default)]
    pub must_staple: bool,
}

impl CsrParams {
    /// The extensions placed in the request's extensionRequest attribute.
    pub fn requested_extensions(&self) -> Result<Vec<ExtensionParam>> {
        let mut extensions = Vec::new();

        if !self.san.is_empty() {
            let san = SubjectAltName {
                names: self.san.clone(),
            };
            extensions.push(ExtensionParam::from_extension(san, false)?);
        }

        if self.must_staple {
            extensions.push(ExtensionParam::from_extension(
                TlsFeature::must_staple(),
                false,
            )?);
        }

        Ok(extensions)
    }

    /// Builds the request and signs it with `key`.
    ///
    /// The signature algorithm follows the key: SHA-256 with RSA PKCS#1 v1.5,
    /// ECDSA P-256 with SHA-256, or ECDSA P-384 with SHA-384.
    pub fn sign(&self, key: &PrivateKey) -> Result<CertificateRequest> {
        let extensions = self.requested_extensions()?;

        let attributes = if extensions.is_empty() {
            SetOfVec::new()
        } else {
            let extension_req = ExtensionReq(
                extensions
                    .iter()
                    .map(ExtensionParam::to_x509_extension)
                    .collect::<Result<Vec<_>>>()?,
            );
            let value = Any::from_der(&extension_req.to_der()?)?;
            SetOfVec::try_from(vec![Attribute {
                oid: ExtensionReq::OID,
                values: SetOfVec::try_from(vec![value])?,
            }])?
        };

        let info = CertReqInfo {
            version: Version::V1,
            subject: DistinguishedName::new(self.common_name.as_str()).as_x509_name()?,
            public_key: key.public_key_info()?,
            attributes,
        };

        let signature = key.sign(&info.to_der()?)?;
        let inner = CertReq {
            info,
            algorithm: key.signature_algorithm().into(),
            signature: cert::signature_bits(&signature)?,
        };

        log::debug!(
            "Signed certificate request for {} with {} SAN entries (must-staple: {})",
            self.common_name,
            self.san.len(),
            self.must_staple
        );

        let raw = inner.to_der()?;
        Ok(CertificateRequest { inner, raw })
    }
}

/// Builds a DER encoded certificate signing request.
///
/// `san` is attached verbatim when non-empty; `must_staple` adds the TLS Feature extension.
pub fn generate_csr(
    key: &PrivateKey,
    domain: &str,
    san: &[String],
    must_staple: bool,
) -> Result<Vec<u8>> {
    let csr = CsrParams::builder()
        .common_name(domain)
        .san(san.to_vec())
        .must_staple(must_staple)
        .build()
        .sign(key)?;
    Ok(csr.raw)
}

/// A parsed certificate signing request together with its encoded form.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    inner: CertReq,
    raw: Vec<u8>,
}

impl CertificateRequest {
    /// Parses a DER encoded PKCS#10 request.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner =
            CertReq::from_der(der).map_err(|e| CertCryptoError::MalformedCsr(e.to_string()))?;
        Ok(Self {
            inner,
            raw: der.to_vec(),
        })
    }

    /// The request exactly as it was signed or parsed.
    pub fn as_der(&self) -> &[u8] {
        &self.raw
    }

    pub fn to_der(&self) -> Vec<u8> {
        self.raw.clone()
    }

    pub fn inner(&self) -> &CertReq {
        &self.inner
    }

    pub fn common_name(&self) -> Option<String> {
        DistinguishedName::from_x509_name(&self.inner.info.subject).map(|dn| dn.common_name)
    }

    /// Extensions carried in extensionRequest attributes, in encoding order.
    pub fn extensions(&self) -> Result<Vec<ExtensionParam>> {
        let mut extensions = Vec::new();
        for attribute in self.inner.info.attributes.iter() {
            if attribute.oid != ExtensionReq::OID {
                continue;
            }
            for value in attribute.values.iter() {
                let extension_req: ExtensionReq = value
                    .decode_as()
                    .map_err(|e| CertCryptoError::MalformedCsr(e.to_string()))?;
                extensions.extend(
                    extension_req
                        .0
                        .iter()
                        .map(ExtensionParam::from_x509_extension),
                );
            }
        }
        Ok(extensions)
    }

    /// DNS names of the requested SubjectAltName extension, empty when there is none.
    pub fn dns_names(&self) -> Result<Vec<String>> {
        let extensions = self.extensions()?;
        match extensions.iter().find(|ext| ext.oid == SubjectAltName::OID) {
            Some(ext) => Ok(ext.to_extension::<SubjectAltName>()?.names),
            None => Ok(Vec::new()),
        }
    }

    /// Whether a TLS Feature extension requests `status_request`.
    pub fn must_staple(&self) -> Result<bool> {
        for ext in self.extensions()? {
            if ext.oid == TlsFeature::OID && ext.to_extension::<TlsFeature>()?.is_must_staple() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::try_from(&self.inner.algorithm)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.info.public_key)
    }

    /// Checks the request's self-signature against the public key it carries.
    pub fn verify(&self) -> Result<()> {
        let info = self.inner.info.to_der()?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            CertCryptoError::InvalidSignature("signature has unused bits".to_string())
        })?;
        self.public_key()?
            .verify(&self.inner.algorithm, &info, signature)
    }
}
