#![allow(dead_code)]

use std::sync::OnceLock;

use certcrypto::cert;
use certcrypto::cert::params::ExtensionParam;
use certcrypto::key::{KeyType, PrivateKey};
use time::OffsetDateTime;

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One RSA-2048 key shared by every test in the binary; generating it is slow.
pub fn rsa_key() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    KEY.get_or_init(|| PrivateKey::generate(KeyType::Rsa2048).unwrap())
}

/// A self-signed certificate for `domain` signed by [`rsa_key`].
pub fn self_signed_der(domain: &str, expiration: Option<OffsetDateTime>) -> Vec<u8> {
    cert::generate_der_cert(rsa_key(), expiration, domain, &[]).unwrap()
}

pub fn self_signed_der_with(domain: &str, extensions: &[ExtensionParam]) -> Vec<u8> {
    cert::generate_der_cert(rsa_key(), None, domain, extensions).unwrap()
}
