//! The RSA primitive provider boundary.
//!
//! Everything that touches RSA arithmetic, hashing or padding bytes sits behind
//! [`RsaProvider`]. The key managers only validate, resolve parameters and
//! assemble records; the provider is injected so tests can substitute a
//! deterministic implementation.

use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::{bit_length, trim_leading_zeros};
use crate::error::Error;
use crate::resolver::PaddingSpec;

/// Smallest modulus accepted for any key.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Largest public exponent accepted, in bits.
pub const MAX_PUBLIC_EXPONENT_BITS: usize = 32;

/// Public exponents must be strictly greater than this.
const MIN_PUBLIC_EXPONENT_EXCLUSIVE: u64 = 65536;

/// Capability to sign messages with a fixed key and padding.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Capability to verify signatures with a fixed key and padding.
pub trait Verifier: Send + Sync {
    /// Returns [`Error::InvalidSignature`] for every kind of mismatch.
    fn verify(&self, signature: &[u8], message: &[u8]) -> Result<(), Error>;
}

/// Raw output of key pair generation. Big-endian bytes, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RsaKeyMaterial {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
    pub d: Vec<u8>,
    pub p: Vec<u8>,
    pub q: Vec<u8>,
}

/// Borrowed view of every private component needed to build a signer.
#[derive(Clone, Copy)]
pub struct RsaPrivateParts<'a> {
    pub n: &'a [u8],
    pub e: &'a [u8],
    pub d: &'a [u8],
    pub p: &'a [u8],
    pub q: &'a [u8],
    pub dp: &'a [u8],
    pub dq: &'a [u8],
}

/// Trusted provider of RSA primitives.
///
/// Implementations must be safe to share across threads; any entropy source
/// they consume is their own responsibility.
pub trait RsaProvider: Send + Sync {
    /// Reject moduli below [`MIN_MODULUS_BITS`].
    fn validate_modulus_size(&self, bits: usize) -> Result<(), Error> {
        if bits < MIN_MODULUS_BITS {
            return Err(Error::ModulusTooSmall {
                bits,
                min: MIN_MODULUS_BITS,
            });
        }
        Ok(())
    }

    /// Require an odd exponent above 65536 that fits in 32 bits.
    fn validate_public_exponent(&self, exponent: &[u8]) -> Result<(), Error> {
        let trimmed = trim_leading_zeros(exponent);
        if trimmed.is_empty() {
            return Err(Error::InvalidExponent("exponent is zero".to_string()));
        }
        if bit_length(trimmed) > MAX_PUBLIC_EXPONENT_BITS {
            return Err(Error::InvalidExponent(format!(
                "exponent exceeds {} bits",
                MAX_PUBLIC_EXPONENT_BITS
            )));
        }
        let value = trimmed
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        if value % 2 == 0 {
            return Err(Error::InvalidExponent("exponent must be odd".to_string()));
        }
        if value <= MIN_PUBLIC_EXPONENT_EXCLUSIVE {
            return Err(Error::InvalidExponent(format!(
                "exponent must be greater than {}",
                MIN_PUBLIC_EXPONENT_EXCLUSIVE
            )));
        }
        Ok(())
    }

    /// Draw a fresh key pair whose modulus has at least `modulus_bits` bits.
    fn generate_rsa_key_pair(
        &self,
        modulus_bits: usize,
        public_exponent: &[u8],
    ) -> Result<RsaKeyMaterial, Error>;

    fn build_signer(
        &self,
        key: RsaPrivateParts<'_>,
        padding: PaddingSpec,
    ) -> Result<Box<dyn Signer>, Error>;

    fn build_verifier(
        &self,
        n: &[u8],
        e: &[u8],
        padding: PaddingSpec,
    ) -> Result<Box<dyn Verifier>, Error>;
}

impl<P: RsaProvider + ?Sized> RsaProvider for Arc<P> {
    fn validate_modulus_size(&self, bits: usize) -> Result<(), Error> {
        (**self).validate_modulus_size(bits)
    }

    fn validate_public_exponent(&self, exponent: &[u8]) -> Result<(), Error> {
        (**self).validate_public_exponent(exponent)
    }

    fn generate_rsa_key_pair(
        &self,
        modulus_bits: usize,
        public_exponent: &[u8],
    ) -> Result<RsaKeyMaterial, Error> {
        (**self).generate_rsa_key_pair(modulus_bits, public_exponent)
    }

    fn build_signer(
        &self,
        key: RsaPrivateParts<'_>,
        padding: PaddingSpec,
    ) -> Result<Box<dyn Signer>, Error> {
        (**self).build_signer(key, padding)
    }

    fn build_verifier(
        &self,
        n: &[u8],
        e: &[u8],
        padding: PaddingSpec,
    ) -> Result<Box<dyn Verifier>, Error> {
        (**self).build_verifier(n, e, padding)
    }
}
