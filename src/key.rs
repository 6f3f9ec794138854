use std::fmt;
use std::str::FromStr;

use const_oid::ObjectIdentifier;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1};
use rand_core::{OsRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::cert::SignatureAlgorithm;
use crate::error::{CertCryptoError, Result};
use crate::pem_utils::{self, PemLabel};

/// Key algorithm together with the key size or curve to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// ECDSA on NIST P-256.
    Ec256,
    /// ECDSA on NIST P-384.
    Ec384,
    /// RSA with a 2048-bit modulus.
    Rsa2048,
    /// RSA with a 4096-bit modulus.
    Rsa4096,
    /// RSA with an 8192-bit modulus.
    Rsa8192,
}

impl KeyType {
    /// Every supported key type.
    pub const ALL: [KeyType; 5] = [
        KeyType::Ec256,
        KeyType::Ec384,
        KeyType::Rsa2048,
        KeyType::Rsa4096,
        KeyType::Rsa8192,
    ];

    /// The identifier used on the command line and in stored account data.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ec256 => "P256",
            KeyType::Ec384 => "P384",
            KeyType::Rsa2048 => "2048",
            KeyType::Rsa4096 => "4096",
            KeyType::Rsa8192 => "8192",
        }
    }

    /// Modulus length for the RSA variants.
    pub fn rsa_bits(&self) -> Option<usize> {
        match self {
            KeyType::Rsa2048 => Some(2048),
            KeyType::Rsa4096 => Some(4096),
            KeyType::Rsa8192 => Some(8192),
            KeyType::Ec256 | KeyType::Ec384 => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = CertCryptoError;

    fn from_str(s: &str) -> Result<Self> {
        KeyType::ALL
            .into_iter()
            .find(|key_type| key_type.as_str() == s)
            .ok_or_else(|| CertCryptoError::UnsupportedKeyType(s.to_string()))
    }
}

/// A private key for one of the supported algorithms.
///
/// Each variant keeps its public half next to the secret so that the SPKI and signature
/// algorithm can be derived without recomputation.
#[derive(Clone)]
pub enum PrivateKey {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: p256::ecdsa::SigningKey,
        verifying_key: p256::ecdsa::VerifyingKey,
    },
    EcdsaP384 {
        signing_key: p384::ecdsa::SigningKey,
        verifying_key: p384::ecdsa::VerifyingKey,
    },
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivateKey::Rsa { public, .. } => f
                .debug_struct("PrivateKey::Rsa")
                .field("bits", &(public.size() * 8))
                .finish_non_exhaustive(),
            PrivateKey::EcdsaP256 { .. } => f.write_str("PrivateKey::EcdsaP256 { .. }"),
            PrivateKey::EcdsaP384 { .. } => f.write_str("PrivateKey::EcdsaP384 { .. }"),
        }
    }
}

impl PrivateKey {
    /// Generates a fresh private key for `key_type` from the operating system's CSPRNG.
    ///
    /// RSA generation is CPU-bound and takes seconds for 8192-bit keys; latency-sensitive
    /// callers should run it on a worker thread.
    pub fn generate(key_type: KeyType) -> Result<Self> {
        log::debug!("Generating {key_type} private key");
        match key_type {
            KeyType::Ec256 => Self::generate_ecdsa_p256(),
            KeyType::Ec384 => Self::generate_ecdsa_p384(),
            KeyType::Rsa2048 => Self::generate_rsa(2048),
            KeyType::Rsa4096 => Self::generate_rsa(4096),
            KeyType::Rsa8192 => Self::generate_rsa(8192),
        }
    }

    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        // OsRng panics inside key generation if the source fails; probe it first.
        fill_random(&mut [0u8; 32])?;
        let private = RsaPrivateKey::new(&mut OsRng, bits)?;
        let public = RsaPublicKey::from(&private);
        Ok(PrivateKey::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Result<Self> {
        fill_random(&mut [0u8; 32])?;
        let signing_key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        Ok(PrivateKey::EcdsaP256 {
            signing_key,
            verifying_key,
        })
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Result<Self> {
        fill_random(&mut [0u8; 32])?;
        let signing_key = p384::ecdsa::SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        Ok(PrivateKey::EcdsaP384 {
            signing_key,
            verifying_key,
        })
    }

    /// The key type this key was generated for, if it matches one.
    ///
    /// Imported RSA keys with a modulus outside 2048/4096/8192 have no key type.
    pub fn key_type(&self) -> Option<KeyType> {
        match self {
            PrivateKey::Rsa { public, .. } => {
                let bits = public.size() * 8;
                KeyType::ALL
                    .into_iter()
                    .find(|key_type| key_type.rsa_bits() == Some(bits))
            }
            PrivateKey::EcdsaP256 { .. } => Some(KeyType::Ec256),
            PrivateKey::EcdsaP384 { .. } => Some(KeyType::Ec384),
        }
    }

    /// The PEM label this key is stored under.
    pub fn pem_label(&self) -> PemLabel {
        match self {
            PrivateKey::Rsa { .. } => PemLabel::RsaPrivateKey,
            PrivateKey::EcdsaP256 { .. } | PrivateKey::EcdsaP384 { .. } => PemLabel::EcPrivateKey,
        }
    }

    /// The signature algorithm used when this key signs a request or certificate.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            PrivateKey::Rsa { .. } => SignatureAlgorithm::Sha256WithRSA,
            PrivateKey::EcdsaP256 { .. } => SignatureAlgorithm::Sha256WithECDSA,
            PrivateKey::EcdsaP384 { .. } => SignatureAlgorithm::Sha384WithECDSA,
        }
    }

    /// Serializes the key as PKCS#1 (RSA) or SEC1 (EC) DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        match self {
            PrivateKey::Rsa { private, .. } => private
                .to_pkcs1_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| CertCryptoError::EncodingError(e.to_string())),
            PrivateKey::EcdsaP256 { signing_key, .. } => {
                p256::SecretKey::from_bytes(&signing_key.to_bytes())
                    .map_err(|e| CertCryptoError::EncodingError(e.to_string()))?
                    .to_sec1_der()
                    .map(|der| der.to_vec())
                    .map_err(|e| CertCryptoError::EncodingError(e.to_string()))
            }
            PrivateKey::EcdsaP384 { signing_key, .. } => {
                p384::SecretKey::from_bytes(&signing_key.to_bytes())
                    .map_err(|e| CertCryptoError::EncodingError(e.to_string()))?
                    .to_sec1_der()
                    .map(|der| der.to_vec())
                    .map_err(|e| CertCryptoError::EncodingError(e.to_string()))
            }
        }
    }

    /// Parses a PEM encoded `RSA PRIVATE KEY` or `EC PRIVATE KEY` block.
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let (label, der) = pem_utils::decode(pem)?;
        match PemLabel::from_tag(&label) {
            Some(PemLabel::RsaPrivateKey) => Self::from_pkcs1_der(&der),
            Some(PemLabel::EcPrivateKey) => Self::from_sec1_der(&der),
            _ => Err(CertCryptoError::UnexpectedBlockType {
                expected: format!(
                    "{} or {}",
                    PemLabel::RsaPrivateKey,
                    PemLabel::EcPrivateKey
                ),
                found: label,
            }),
        }
    }

    /// Parses a PKCS#1 `RSAPrivateKey` structure.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| CertCryptoError::MalformedPrivateKey(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(PrivateKey::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Parses a SEC1 `ECPrivateKey` structure on P-256 or P-384.
    ///
    /// The embedded named-curve parameter decides the curve; a key whose curve does not match
    /// is rejected by the curve-specific decoder.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        if let Ok(secret) = p256::SecretKey::from_sec1_der(der) {
            let signing_key = p256::ecdsa::SigningKey::from(&secret);
            let verifying_key = *signing_key.verifying_key();
            return Ok(PrivateKey::EcdsaP256 {
                signing_key,
                verifying_key,
            });
        }

        let secret = p384::SecretKey::from_sec1_der(der).map_err(|_| {
            CertCryptoError::MalformedPrivateKey(
                "not a P-256 or P-384 EC private key".to_string(),
            )
        })?;
        let signing_key = p384::ecdsa::SigningKey::from(&secret);
        let verifying_key = *signing_key.verifying_key();
        Ok(PrivateKey::EcdsaP384 {
            signing_key,
            verifying_key,
        })
    }

    /// Subject public key info for the public half of this key.
    pub fn public_key_info(&self) -> Result<SubjectPublicKeyInfoOwned> {
        PublicKey::from_private_key(self).to_spki()
    }

    /// Signs `data` with the algorithm returned by [`PrivateKey::signature_algorithm`].
    ///
    /// ECDSA signatures are returned DER encoded, as X.509 and PKCS#10 carry them.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            PrivateKey::Rsa { private, .. } => {
                let signing_key =
                    rsa::pkcs1v15::SigningKey::<Sha256>::new(private.as_ref().clone());
                let signature = signing_key
                    .try_sign(data)
                    .map_err(|e| CertCryptoError::SigningError(e.to_string()))?;
                Ok(signature.to_vec())
            }
            PrivateKey::EcdsaP256 { signing_key, .. } => {
                let signature: p256::ecdsa::DerSignature = signing_key
                    .try_sign(data)
                    .map_err(|e| CertCryptoError::SigningError(e.to_string()))?;
                Ok(signature.as_bytes().to_vec())
            }
            PrivateKey::EcdsaP384 { signing_key, .. } => {
                let signature: p384::ecdsa::DerSignature = signing_key
                    .try_sign(data)
                    .map_err(|e| CertCryptoError::SigningError(e.to_string()))?;
                Ok(signature.as_bytes().to_vec())
            }
        }
    }
}

/// Public half of a supported key, as found in certificates and requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
}

impl PublicKey {
    pub fn from_private_key(key: &PrivateKey) -> Self {
        match key {
            PrivateKey::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            PrivateKey::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            PrivateKey::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
        }
    }

    /// Reads a public key out of a subject public key info structure.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let key_bytes = spki.subject_public_key.raw_bytes();
        let malformed = |e: &dyn fmt::Display| CertCryptoError::InvalidInput(e.to_string());

        match spki.algorithm.oid {
            RSA_ENCRYPTION => RsaPublicKey::from_pkcs1_der(key_bytes)
                .map(PublicKey::Rsa)
                .map_err(|e| malformed(&e)),
            ID_EC_PUBLIC_KEY => {
                let curve = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|params| params.decode_as::<ObjectIdentifier>().ok());
                match curve {
                    Some(SECP_256_R_1) => p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                        .map(PublicKey::EcdsaP256)
                        .map_err(|e| malformed(&e)),
                    Some(SECP_384_R_1) => p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                        .map(PublicKey::EcdsaP384)
                        .map_err(|e| malformed(&e)),
                    _ => Err(CertCryptoError::UnsupportedKeyType(format!(
                        "EC public key on curve {curve:?}"
                    ))),
                }
            }
            other => Err(CertCryptoError::UnsupportedKeyType(format!(
                "public key algorithm {other}"
            ))),
        }
    }

    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone()),
            PublicKey::EcdsaP256(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
            PublicKey::EcdsaP384(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
        };
        spki.map_err(|e| CertCryptoError::EncodingError(e.to_string()))
    }

    /// Checks `signature` over `data` under `algorithm`.
    ///
    /// The algorithm has to agree with the key: an RSA key never verifies an ECDSA signature.
    pub fn verify(
        &self,
        algorithm: &AlgorithmIdentifierOwned,
        data: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        let invalid = |e: &dyn fmt::Display| CertCryptoError::InvalidSignature(e.to_string());
        let algorithm = SignatureAlgorithm::try_from(algorithm)?;

        match (self, algorithm) {
            (PublicKey::Rsa(public), SignatureAlgorithm::Sha256WithRSA) => {
                let verifying_key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public.clone());
                let signature =
                    rsa::pkcs1v15::Signature::try_from(signature).map_err(|e| invalid(&e))?;
                verifying_key
                    .verify(data, &signature)
                    .map_err(|e| invalid(&e))
            }
            (PublicKey::EcdsaP256(verifying_key), SignatureAlgorithm::Sha256WithECDSA) => {
                let signature =
                    p256::ecdsa::DerSignature::try_from(signature).map_err(|e| invalid(&e))?;
                verifying_key
                    .verify(data, &signature)
                    .map_err(|e| invalid(&e))
            }
            (PublicKey::EcdsaP384(verifying_key), SignatureAlgorithm::Sha384WithECDSA) => {
                let signature =
                    p384::ecdsa::DerSignature::try_from(signature).map_err(|e| invalid(&e))?;
                verifying_key
                    .verify(data, &signature)
                    .map_err(|e| invalid(&e))
            }
            (_, algorithm) => Err(CertCryptoError::InvalidSignature(format!(
                "{algorithm:?} does not match the public key type"
            ))),
        }
    }
}

/// Fills `buf` from the operating system's CSPRNG, reporting failure instead of panicking.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CertCryptoError::RngFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_string_forms() {
        for key_type in KeyType::ALL {
            assert_eq!(key_type.to_string().parse::<KeyType>().unwrap(), key_type);
        }
        assert_eq!("P256".parse::<KeyType>().unwrap(), KeyType::Ec256);
        assert_eq!("8192".parse::<KeyType>().unwrap(), KeyType::Rsa8192);
        assert_eq!(
            "1024".parse::<KeyType>(),
            Err(CertCryptoError::UnsupportedKeyType("1024".to_string()))
        );
    }

    #[test]
    fn test_generated_key_reports_its_type() {
        for key_type in [KeyType::Ec256, KeyType::Ec384, KeyType::Rsa2048] {
            let key = PrivateKey::generate(key_type).unwrap();
            assert_eq!(key.key_type(), Some(key_type));
        }
    }

    #[test]
    fn test_sign_and_verify_each_family() {
        let data = b"certificate request info";
        for key_type in [KeyType::Ec256, KeyType::Ec384, KeyType::Rsa2048] {
            let key = PrivateKey::generate(key_type).unwrap();
            let algorithm: AlgorithmIdentifierOwned = key.signature_algorithm().into();
            let signature = key.sign(data).unwrap();
            let public = PublicKey::from_private_key(&key);

            public.verify(&algorithm, data, &signature).unwrap();
            assert!(matches!(
                public.verify(&algorithm, b"tampered", &signature),
                Err(CertCryptoError::InvalidSignature(_))
            ));
        }
    }

    #[test]
    fn test_ec_generation_reports_curve() {
        assert!(matches!(
            PrivateKey::generate_ecdsa_p256(),
            Ok(PrivateKey::EcdsaP256 { .. })
        ));
        assert!(matches!(
            PrivateKey::generate_ecdsa_p384(),
            Ok(PrivateKey::EcdsaP384 { .. })
        ));
    }

    #[test]
    fn test_spki_round_trip() {
        let key = PrivateKey::generate_ecdsa_p384().unwrap();
        let spki = key.public_key_info().unwrap();
        let public = PublicKey::from_x509spki(&spki).unwrap();
        assert_eq!(public, PublicKey::from_private_key(&key));
    }

    #[test]
    fn test_sec1_rejects_garbage() {
        assert!(matches!(
            PrivateKey::from_sec1_der(&[0x30, 0x03, 0x02, 0x01, 0x01]),
            Err(CertCryptoError::MalformedPrivateKey(_))
        ));
    }

    #[test]
    fn test_from_pem_rejects_other_labels() {
        let pem = pem_utils::der_to_pem(&[0x30, 0x00], "PRIVATE KEY");
        assert!(matches!(
            PrivateKey::from_pem(pem),
            Err(CertCryptoError::UnexpectedBlockType { .. })
        ));
    }
}
