//! RSA key pair generation.
//!
//! The provider draws the primes; this module checks that what came back
//! actually fits the requested format, derives the CRT exponents and
//! assembles the key records. A failed check discards the material.

use rsa::BigUint;
use tracing::{info, warn};

use crate::config::ManagerConfig;
use crate::error::Error;
use crate::provider::{RsaKeyMaterial, RsaProvider};
use crate::types::{KeyFormat, PrivateKey, PublicKey, KEY_VERSION};
use crate::validation::validate_key_format;

/// Generate a new private key for `format`.
///
/// Every call is an independent draw from the provider. Provider failures are
/// never retried.
///
/// # Arguments
///
/// * `provider` - Source of the key pair
/// * `config` - Policy applied on top of the provider's checks
/// * `format` - Algorithm, modulus size and public exponent of the new key
///
/// # Returns
///
/// A private key with version 0, CRT parameters and the embedded public key.
///
/// # Errors
///
/// Returns the format validation error unchanged if `format` is rejected, or
/// [`Error::GenerationFailed`] if the provider fails or hands back material
/// that does not fit `format`.
pub fn generate_private_key<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    format: &KeyFormat,
) -> Result<PrivateKey, Error> {
    validate_key_format(provider, config, format)?;

    let modulus_bits = format.modulus_size_in_bits as usize;
    info!(algorithm = %format.algorithm, modulus_bits, "generating RSA key pair");

    let material = provider
        .generate_rsa_key_pair(modulus_bits, &format.public_exponent)
        .map_err(|err| {
            warn!(algorithm = %format.algorithm, modulus_bits, error = %err, "RSA provider failed to generate key pair");
            if matches!(err, Error::GenerationFailed(_)) {
                err
            } else {
                Error::GenerationFailed(err.to_string())
            }
        })?;

    let key = assemble(&material, format).map_err(|err| {
        warn!(algorithm = %format.algorithm, modulus_bits, error = %err, "discarding generated key material");
        err
    })?;

    info!(algorithm = %format.algorithm, modulus_bits, "generated RSA key pair");
    Ok(key)
}

fn assemble(material: &RsaKeyMaterial, format: &KeyFormat) -> Result<PrivateKey, Error> {
    let n = BigUint::from_bytes_be(&material.n);
    let e = BigUint::from_bytes_be(&material.e);
    let d = BigUint::from_bytes_be(&material.d);
    let p = BigUint::from_bytes_be(&material.p);
    let q = BigUint::from_bytes_be(&material.q);
    let one = BigUint::from(1u32);

    let requested_bits = format.modulus_size_in_bits as usize;
    if n.bits() < requested_bits {
        return Err(Error::GenerationFailed(format!(
            "modulus has {} bits, {} requested",
            n.bits(),
            requested_bits
        )));
    }
    if e != BigUint::from_bytes_be(&format.public_exponent) {
        return Err(Error::GenerationFailed(
            "provider used a different public exponent".to_string(),
        ));
    }
    if p <= one || q <= one || p == q {
        return Err(Error::GenerationFailed(
            "provider returned degenerate primes".to_string(),
        ));
    }
    if &p * &q != n {
        return Err(Error::GenerationFailed(
            "modulus is not the product of the generated primes".to_string(),
        ));
    }

    let dp = &d % &(&p - &one);
    let dq = &d % &(&q - &one);

    let public_key = PublicKey::new(
        KEY_VERSION,
        n.to_bytes_be(),
        format.public_exponent.clone(),
        format.algorithm,
    );
    Ok(PrivateKey::new(
        KEY_VERSION,
        public_key,
        d.to_bytes_be(),
        p.to_bytes_be(),
        q.to_bytes_be(),
        dp.to_bytes_be(),
        dq.to_bytes_be(),
    ))
}

/// Copy of the public half of `key`. Performs no validation.
pub fn get_public_key(key: &PrivateKey) -> PublicKey {
    key.public_key().clone()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::crypto::RustCryptoProvider;
    use crate::encoding::bit_length;
    use crate::testing::{synthetic_material, FakeProvider, Tamper};
    use crate::types::Algorithm;

    /// Sanity checks that a generated private key fits its format.
    fn check_new_key(key: &PrivateKey, format: &KeyFormat) {
        let public_key = key.public_key();
        assert_eq!(key.version(), 0);
        assert_eq!(public_key.version(), key.version());
        assert!(!public_key.n().is_empty());
        assert!(!public_key.e().is_empty());
        assert_eq!(public_key.algorithm(), format.algorithm);
        assert_eq!(public_key.e(), format.public_exponent.as_slice());

        let n = BigUint::from_bytes_be(public_key.n());
        let d = BigUint::from_bytes_be(key.d());
        let p = BigUint::from_bytes_be(key.p());
        let q = BigUint::from_bytes_be(key.q());
        let dp = BigUint::from_bytes_be(key.dp());
        let dq = BigUint::from_bytes_be(key.dq());
        let one = BigUint::from(1u32);

        assert_eq!(&p * &q, n);
        assert!(bit_length(public_key.n()) >= format.modulus_size_in_bits as usize);
        assert_eq!(&d % &(&p - &one), dp);
        assert_eq!(&d % &(&q - &one), dq);
    }

    fn generate_real(format: &KeyFormat) -> PrivateKey {
        generate_private_key(&RustCryptoProvider, &ManagerConfig::default(), format).unwrap()
    }

    #[test]
    fn test_generate_2048() {
        let format = KeyFormat::with_f4(Algorithm::Ps256, 2048);
        check_new_key(&generate_real(&format), &format);
    }

    #[test]
    fn test_generate_3072() {
        let format = KeyFormat::with_f4(Algorithm::Rs384, 3072);
        check_new_key(&generate_real(&format), &format);
    }

    #[test]
    #[ignore = "4096-bit prime search is slow"]
    fn test_generate_4096() {
        let format = KeyFormat::with_f4(Algorithm::Ps512, 4096);
        check_new_key(&generate_real(&format), &format);
    }

    #[test]
    fn test_assemble_large_moduli() {
        for (alg, bits) in [(Algorithm::Rs384, 3072), (Algorithm::Ps512, 4096)] {
            let format = KeyFormat::with_f4(alg, bits);
            let provider = FakeProvider::with_material(synthetic_material(bits as usize));
            let key =
                generate_private_key(&provider, &ManagerConfig::default(), &format).unwrap();
            check_new_key(&key, &format);
            assert_eq!(bit_length(key.public_key().n()), bits as usize);
        }
    }

    #[test]
    fn test_generate_always_new_primes() {
        let format = KeyFormat::with_f4(Algorithm::Ps256, 2048);
        let num_generated_keys = 5;
        let mut primes = HashSet::new();
        for _ in 0..num_generated_keys {
            let key = generate_real(&format);
            primes.insert(key.p().to_vec());
            primes.insert(key.q().to_vec());
        }
        assert_eq!(primes.len(), 2 * num_generated_keys);
    }

    #[test]
    fn test_fake_provider_arithmetic() {
        for alg in Algorithm::SUPPORTED {
            let format = KeyFormat::with_f4(alg, 2048);
            let key =
                generate_private_key(&FakeProvider::new(), &ManagerConfig::default(), &format)
                    .unwrap();
            check_new_key(&key, &format);
        }
    }

    #[test]
    fn test_invalid_format_never_reaches_provider() {
        let provider = FakeProvider::new();
        let format = KeyFormat::with_f4(Algorithm::Rs256, 512);
        assert!(matches!(
            generate_private_key(&provider, &ManagerConfig::default(), &format),
            Err(Error::ModulusTooSmall { .. })
        ));
        let format = KeyFormat::with_f4(Algorithm::Unknown, 2048);
        assert!(matches!(
            generate_private_key(&provider, &ManagerConfig::default(), &format),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert_eq!(provider.generate_calls(), 0);
    }

    #[test]
    fn test_provider_failure_surfaces_as_generation_failed() {
        let provider = FakeProvider::failing();
        let format = KeyFormat::with_f4(Algorithm::Rs256, 2048);
        let err = generate_private_key(&provider, &ManagerConfig::default(), &format).unwrap_err();
        assert!(matches!(err, Error::GenerationFailed(_)));
        assert!(err.to_string().contains("entropy"));
        // Not retried.
        assert_eq!(provider.generate_calls(), 1);
    }

    #[test]
    fn test_short_modulus_from_provider_rejected() {
        // The fake always hands out 2048-bit material.
        let format = KeyFormat::with_f4(Algorithm::Rs256, 3072);
        assert!(matches!(
            generate_private_key(&FakeProvider::new(), &ManagerConfig::default(), &format),
            Err(Error::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_tampered_material_rejected() {
        let format = KeyFormat::with_f4(Algorithm::Ps384, 2048);
        for tamper in [
            Tamper::ModulusNotProduct,
            Tamper::WrongExponent,
            Tamper::RepeatedPrime,
        ] {
            let result = generate_private_key(
                &FakeProvider::tampered(tamper),
                &ManagerConfig::default(),
                &format,
            );
            assert!(
                matches!(result, Err(Error::GenerationFailed(_))),
                "{:?} was accepted",
                tamper
            );
        }
    }

    #[test]
    fn test_exponent_bytes_preserved() {
        // 65537 with a redundant leading zero still equals the provider's exponent.
        let format = KeyFormat::new(Algorithm::Rs512, 2048, vec![0x00, 0x01, 0x00, 0x01]);
        let key = generate_private_key(&FakeProvider::new(), &ManagerConfig::default(), &format)
            .unwrap();
        assert_eq!(key.public_key().e(), &[0x00, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_get_public_key() {
        let key = crate::testing::private_key(Algorithm::Ps256);
        let public_key = get_public_key(&key);
        assert_eq!(public_key.version(), key.public_key().version());
        assert_eq!(public_key.n(), key.public_key().n());
        assert_eq!(public_key.e(), key.public_key().e());
        assert_eq!(public_key.algorithm(), Algorithm::Ps256);
    }
}
