//! # certcrypto - Certificate Material for ACME Clients
//!
//! certcrypto produces and inspects the cryptographic material an ACME client handles,
//! built entirely on RustCrypto libraries (OpenSSL is only used from an ignored test).
//! It covers account and certificate keys, PEM encoding, certificate signing requests with
//! SubjectAltName and OCSP must-staple, PEM certificate bundles, certificate expiration and
//! transient self-signed certificates for TLS-ALPN-01 validation.
//!
//! ## Supported Key Types
//!
//! - **ECDSA**: P-256 and P-384 (`"P256"`, `"P384"`)
//! - **RSA**: 2048, 4096 and 8192-bit keys (`"2048"`, `"4096"`, `"8192"`)
//!
//! ## Quick Start
//!
//! ### Generating a Key and a CSR
//!
//! ```rust,no_run
//! use certcrypto::{csr, key::{KeyType, PrivateKey}, pem_utils};
//!
//! # fn main() -> certcrypto::error::Result<()> {
//! let key = PrivateKey::generate(KeyType::Ec256)?;
//! let key_pem = pem_utils::encode(&key)?;
//!
//! let san = vec!["example.com".to_string(), "www.example.com".to_string()];
//! let der = csr::generate_csr(&key, "example.com", &san, true)?;
//!
//! let request = csr::CertificateRequest::from_der(&der)?;
//! println!("{key_pem}{}", pem_utils::encode(&request)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading an Issued Chain
//!
//! ```rust,no_run
//! use certcrypto::cert::{bundle::parse_pem_bundle, expiration::valid_days_left};
//! use time::OffsetDateTime;
//!
//! # fn main() -> certcrypto::error::Result<()> {
//! let chain = std::fs::read("fullchain.pem").unwrap_or_default();
//! let bundle = parse_pem_bundle(&chain)?;
//! println!("leaf expires {}", bundle.leaf().not_after());
//! println!("{} days left", valid_days_left(&chain, OffsetDateTime::now_utc())?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Self-Signed Challenge Certificates
//!
//! ```rust,no_run
//! use certcrypto::{cert, key::{KeyType, PrivateKey}};
//!
//! # fn main() -> certcrypto::error::Result<()> {
//! let key = PrivateKey::generate(KeyType::Rsa2048)?;
//! let pem = cert::generate_pem_cert(&key, "example.com", &[])?;
//! println!("{pem}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`error::CertCryptoError`]:
//!
//! ```rust
//! use certcrypto::{error::CertCryptoError, key::PrivateKey};
//!
//! match PrivateKey::from_pem("invalid pem data") {
//!     Ok(_) => println!("Key imported successfully"),
//!     Err(CertCryptoError::InvalidPem(msg)) => println!("Failed to decode key: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key generation, PKCS#1/SEC1 import and export, signing
//! - [`pem_utils`]: PEM encoding and decoding of keys, requests and certificates
//! - [`csr`]: PKCS#10 requests with SubjectAltName and must-staple
//! - [`cert`]: Certificates, bundles, expiration and self-signed generation
//! - [`issuer`]: The signing step shared by certificate generation
//! - [`ocsp`]: OCSP status values
//! - [`challenge`]: The DNS challenge provider contract
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod challenge;
pub mod csr;
pub mod error;
pub mod issuer;
pub mod key;
pub mod ocsp;
pub mod pem_utils;
pub mod tbs_certificate;
