use time::OffsetDateTime;

use crate::cert::Certificate;
use crate::error::Result;
use crate::pem_utils;

/// Returns the `notAfter` date of a PEM encoded certificate.
///
/// Only the first PEM block is read; split chains with
/// [`parse_pem_bundle`](crate::cert::bundle::parse_pem_bundle) first.
pub fn expiration_from_pem(cert: impl AsRef<[u8]>) -> Result<OffsetDateTime> {
    let (_, der) = pem_utils::decode(cert)?;
    expiration_from_der(&der)
}

/// Returns the `notAfter` date of a DER encoded certificate.
pub fn expiration_from_der(cert: &[u8]) -> Result<OffsetDateTime> {
    Ok(Certificate::from_der(cert)?.not_after())
}

/// Counts the whole days between `now` and the certificate's `notAfter`.
///
/// Negative for an expired certificate. Let's Encrypt issues 90-day certificates, so a fresh
/// one reports 89.
pub fn valid_days_left(cert: impl AsRef<[u8]>, now: OffsetDateTime) -> Result<i64> {
    Ok((expiration_from_pem(cert)? - now).whole_days())
}
