//! Validation of key formats and key records before they are used.

use rsa::BigUint;
use tracing::debug;

use crate::config::{ManagerConfig, PrivateKeyCheck};
use crate::encoding::{bit_length, trim_leading_zeros};
use crate::error::Error;
use crate::provider::RsaProvider;
use crate::resolver::resolve_hash;
use crate::types::{KeyFormat, PrivateKey, PublicKey, KEY_VERSION};

fn rejected(what: &'static str, err: Error) -> Error {
    debug!(target: "jwt_rsa_keys::validation", %what, code = %err.code(), "rejected");
    err
}

fn check_version(found: u32) -> Result<(), Error> {
    if found != KEY_VERSION {
        return Err(Error::VersionMismatch {
            expected: KEY_VERSION,
            found,
        });
    }
    Ok(())
}

fn check_modulus_bits<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    bits: usize,
) -> Result<(), Error> {
    provider.validate_modulus_size(bits)?;
    if bits < config.min_modulus_bits {
        return Err(Error::ModulusTooSmall {
            bits,
            min: config.min_modulus_bits,
        });
    }
    Ok(())
}

/// Check generation parameters before any key material is drawn.
///
/// # Errors
///
/// * [`Error::ModulusTooSmall`] - below the provider or configured floor
/// * [`Error::InvalidExponent`] - the exponent policy is not met
/// * [`Error::UnsupportedAlgorithm`] - the algorithm does not resolve
pub fn validate_key_format<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    format: &KeyFormat,
) -> Result<(), Error> {
    check_modulus_bits(provider, config, format.modulus_size_in_bits as usize)
        .and_then(|_| provider.validate_public_exponent(&format.public_exponent))
        .and_then(|_| resolve_hash(format.algorithm).map(|_| ()))
        .map_err(|e| rejected("key format", e))
}

/// Check a public key before it is used.
///
/// # Errors
///
/// * [`Error::VersionMismatch`] - the version is not 0
/// * [`Error::ModulusTooSmall`] - `n` is below the floor, leading zeros excluded
/// * [`Error::InvalidExponent`] - `e` does not meet the exponent policy
/// * [`Error::UnsupportedAlgorithm`] - the algorithm does not resolve
pub fn validate_public_key<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    key: &PublicKey,
) -> Result<(), Error> {
    check_version(key.version())
        .and_then(|_| check_modulus_bits(provider, config, bit_length(key.n())))
        .and_then(|_| provider.validate_public_exponent(key.e()))
        .and_then(|_| resolve_hash(key.algorithm()).map(|_| ()))
        .map_err(|e| rejected("public key", e))
}

/// Check a private key and its embedded public key.
///
/// With [`PrivateKeyCheck::Full`] the CRT relations are recomputed as well.
///
/// # Errors
///
/// Returns any [`validate_public_key`] error for the embedded key,
/// [`Error::VersionMismatch`] if the two versions differ, or
/// [`Error::InvalidKey`] for an empty component or, under the full check,
/// inconsistent arithmetic.
pub fn validate_private_key<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    key: &PrivateKey,
) -> Result<(), Error> {
    validate_public_key(provider, config, key.public_key())?;

    let found = key.public_key().version();
    if key.version() != found {
        return Err(rejected(
            "private key",
            Error::VersionMismatch {
                expected: key.version(),
                found,
            },
        ));
    }

    let components = [
        ("d", key.d()),
        ("p", key.p()),
        ("q", key.q()),
        ("dp", key.dp()),
        ("dq", key.dq()),
    ];
    for (name, value) in components {
        if trim_leading_zeros(value).is_empty() {
            return Err(rejected(
                "private key",
                Error::InvalidKey(format!("{} is empty or zero", name)),
            ));
        }
    }

    if config.private_key_check == PrivateKeyCheck::Full {
        verify_private_arithmetic(key).map_err(|e| rejected("private key", e))?;
    }
    Ok(())
}

/// Recompute `n = p * q`, `dp = d mod (p - 1)` and `dq = d mod (q - 1)`.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] naming the first relation that does not hold.
pub fn verify_private_arithmetic(key: &PrivateKey) -> Result<(), Error> {
    let n = BigUint::from_bytes_be(key.public_key().n());
    let d = BigUint::from_bytes_be(key.d());
    let p = BigUint::from_bytes_be(key.p());
    let q = BigUint::from_bytes_be(key.q());
    let one = BigUint::from(1u32);

    if p <= one || q <= one {
        return Err(Error::InvalidKey("primes must be greater than one".to_string()));
    }
    if &p * &q != n {
        return Err(Error::InvalidKey("n != p * q".to_string()));
    }
    if &d % &(&p - &one) != BigUint::from_bytes_be(key.dp()) {
        return Err(Error::InvalidKey("dp != d mod (p - 1)".to_string()));
    }
    if &d % &(&q - &one) != BigUint::from_bytes_be(key.dq()) {
        return Err(Error::InvalidKey("dq != d mod (q - 1)".to_string()));
    }
    Ok(())
}
