//! Deterministic provider and cached key material for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use rsa::BigUint;

use crate::config::ManagerConfig;
use crate::crypto::RustCryptoProvider;
use crate::error::Error;
use crate::generator::generate_private_key;
use crate::provider::{RsaKeyMaterial, RsaPrivateParts, RsaProvider, Signer, Verifier};
use crate::resolver::PaddingSpec;
use crate::types::{Algorithm, KeyFormat, PrivateKey, F4};

static PRIMARY: OnceLock<RsaKeyMaterial> = OnceLock::new();
static SECONDARY: OnceLock<RsaKeyMaterial> = OnceLock::new();

fn fresh_2048() -> RsaKeyMaterial {
    RustCryptoProvider
        .generate_rsa_key_pair(2048, &F4)
        .expect("2048-bit generation")
}

/// Real 2048-bit material, generated once per test binary.
pub(crate) fn material_2048() -> RsaKeyMaterial {
    PRIMARY.get_or_init(fresh_2048).clone()
}

/// A second, independent 2048-bit key pair.
pub(crate) fn other_material_2048() -> RsaKeyMaterial {
    SECONDARY.get_or_init(fresh_2048).clone()
}

/// Composite material of exactly `modulus_bits` bits, for exercising key
/// assembly at large sizes without a prime search. Not usable for signing.
pub(crate) fn synthetic_material(modulus_bits: usize) -> RsaKeyMaterial {
    let half = modulus_bits / 2;
    // Top two bits set on both factors, so the product has the full length.
    let p = (BigUint::from(3u32) << (half - 2)) + 1u32;
    let q = p.clone() + 2u32;
    let n = &p * &q;
    let d = &n >> 7;
    RsaKeyMaterial {
        n: n.to_bytes_be(),
        e: F4.to_vec(),
        d: d.to_bytes_be(),
        p: p.to_bytes_be(),
        q: q.to_bytes_be(),
    }
}

/// Ways the fake provider can corrupt the material it hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tamper {
    None,
    ModulusNotProduct,
    WrongExponent,
    RepeatedPrime,
}

/// Serves fixed material instead of drawing new primes, delegating signing
/// and verification to [`RustCryptoProvider`].
pub(crate) struct FakeProvider {
    material: RsaKeyMaterial,
    fail_generation: bool,
    tamper: Tamper,
    generate_calls: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::with_material(material_2048())
    }

    pub(crate) fn with_material(material: RsaKeyMaterial) -> Self {
        Self {
            material,
            fail_generation: false,
            tamper: Tamper::None,
            generate_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail_generation: true,
            ..Self::new()
        }
    }

    pub(crate) fn tampered(tamper: Tamper) -> Self {
        Self {
            tamper,
            ..Self::new()
        }
    }

    pub(crate) fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

impl RsaProvider for FakeProvider {
    fn generate_rsa_key_pair(
        &self,
        _modulus_bits: usize,
        _public_exponent: &[u8],
    ) -> Result<RsaKeyMaterial, Error> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generation {
            return Err(Error::ProviderFailure("entropy source exhausted".to_string()));
        }

        let mut material = self.material.clone();
        match self.tamper {
            Tamper::None => {}
            Tamper::ModulusNotProduct => {
                if let Some(last) = material.n.last_mut() {
                    *last ^= 0x02;
                }
            }
            Tamper::WrongExponent => material.e = vec![0x03],
            Tamper::RepeatedPrime => material.q = material.p.clone(),
        }
        Ok(material)
    }

    fn build_signer(
        &self,
        key: RsaPrivateParts<'_>,
        padding: PaddingSpec,
    ) -> Result<Box<dyn Signer>, Error> {
        RustCryptoProvider.build_signer(key, padding)
    }

    fn build_verifier(
        &self,
        n: &[u8],
        e: &[u8],
        padding: PaddingSpec,
    ) -> Result<Box<dyn Verifier>, Error> {
        RustCryptoProvider.build_verifier(n, e, padding)
    }
}

/// Private key for `algorithm` built from the cached primary material.
pub(crate) fn private_key(algorithm: Algorithm) -> PrivateKey {
    generate_private_key(
        &FakeProvider::new(),
        &ManagerConfig::default(),
        &KeyFormat::with_f4(algorithm, 2048),
    )
    .expect("fake generation")
}

/// Private key for `algorithm` built from the secondary material.
pub(crate) fn other_private_key(algorithm: Algorithm) -> PrivateKey {
    generate_private_key(
        &FakeProvider::with_material(other_material_2048()),
        &ManagerConfig::default(),
        &KeyFormat::with_f4(algorithm, 2048),
    )
    .expect("fake generation")
}
