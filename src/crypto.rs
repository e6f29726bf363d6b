//! Default RSA provider backed by the RustCrypto `rsa` crate.

use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::Error;
use crate::provider::{RsaKeyMaterial, RsaPrivateParts, RsaProvider, Signer, Verifier};
use crate::resolver::PaddingSpec;
use crate::types::HashKind;

/// Largest modulus this provider will load.
pub const MAX_MODULUS_BITS: usize = 16384;

/// Hash `message` with the given hash function.
pub fn digest(hash: HashKind, message: &[u8]) -> Vec<u8> {
    match hash {
        HashKind::Sha256 => Sha256::digest(message).to_vec(),
        HashKind::Sha384 => Sha384::digest(message).to_vec(),
        HashKind::Sha512 => Sha512::digest(message).to_vec(),
    }
}

fn pkcs1_scheme(hash: HashKind) -> Pkcs1v15Sign {
    match hash {
        HashKind::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashKind::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashKind::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

// MGF1 always runs over the signature hash here.
fn pss_scheme(hash: HashKind, salt_len: usize) -> Pss {
    match hash {
        HashKind::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
        HashKind::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
        HashKind::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
    }
}

fn check_padding(padding: PaddingSpec) -> Result<(), Error> {
    if let PaddingSpec::Pss {
        hash, mgf1_hash, ..
    } = padding
    {
        if hash != mgf1_hash {
            return Err(Error::ProviderFailure(
                "MGF1 hash must equal the signature hash".to_string(),
            ));
        }
    }
    Ok(())
}

/// [`RsaProvider`] using `rsa` for key arithmetic and `sha2` for digests.
///
/// Stateless; randomness comes from the operating system on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RsaProvider for RustCryptoProvider {
    fn generate_rsa_key_pair(
        &self,
        modulus_bits: usize,
        public_exponent: &[u8],
    ) -> Result<RsaKeyMaterial, Error> {
        let exponent = BigUint::from_bytes_be(public_exponent);
        let key = RsaPrivateKey::new_with_exp(&mut OsRng, modulus_bits, &exponent)
            .map_err(|e| Error::GenerationFailed(e.to_string()))?;

        let primes = key.primes();
        if primes.len() != 2 {
            return Err(Error::GenerationFailed(format!(
                "expected two primes, got {}",
                primes.len()
            )));
        }

        Ok(RsaKeyMaterial {
            n: key.n().to_bytes_be(),
            e: key.e().to_bytes_be(),
            d: key.d().to_bytes_be(),
            p: primes[0].to_bytes_be(),
            q: primes[1].to_bytes_be(),
        })
    }

    fn build_signer(
        &self,
        key: RsaPrivateParts<'_>,
        padding: PaddingSpec,
    ) -> Result<Box<dyn Signer>, Error> {
        check_padding(padding)?;

        let mut private_key = RsaPrivateKey::from_components(
            BigUint::from_bytes_be(key.n),
            BigUint::from_bytes_be(key.e),
            BigUint::from_bytes_be(key.d),
            vec![BigUint::from_bytes_be(key.p), BigUint::from_bytes_be(key.q)],
        )?;
        private_key.validate()?;
        private_key.precompute()?;

        // The stored CRT exponents must agree with the ones derived from d.
        let dp = BigUint::from_bytes_be(key.dp);
        let dq = BigUint::from_bytes_be(key.dq);
        if private_key.dp() != Some(&dp) || private_key.dq() != Some(&dq) {
            return Err(Error::ProviderFailure(
                "CRT parameters do not match the private exponent".to_string(),
            ));
        }

        Ok(Box::new(RsaSigner {
            key: private_key,
            padding,
        }))
    }

    fn build_verifier(
        &self,
        n: &[u8],
        e: &[u8],
        padding: PaddingSpec,
    ) -> Result<Box<dyn Verifier>, Error> {
        check_padding(padding)?;

        let public_key = RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(n),
            BigUint::from_bytes_be(e),
            MAX_MODULUS_BITS,
        )?;

        Ok(Box::new(RsaVerifier {
            key: public_key,
            padding,
        }))
    }
}

struct RsaSigner {
    key: RsaPrivateKey,
    padding: PaddingSpec,
}

impl Signer for RsaSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        let hashed = digest(self.padding.hash(), message);
        // Blinding draws randomness, but PKCS1 output is still deterministic.
        let signature = match self.padding {
            PaddingSpec::Pkcs1 { hash } => {
                self.key
                    .sign_with_rng(&mut OsRng, pkcs1_scheme(hash), &hashed)?
            }
            PaddingSpec::Pss { hash, salt_len, .. } => {
                self.key
                    .sign_with_rng(&mut OsRng, pss_scheme(hash, salt_len), &hashed)?
            }
        };
        Ok(signature)
    }
}

struct RsaVerifier {
    key: RsaPublicKey,
    padding: PaddingSpec,
}

impl Verifier for RsaVerifier {
    fn verify(&self, signature: &[u8], message: &[u8]) -> Result<(), Error> {
        let hashed = digest(self.padding.hash(), message);
        let result = match self.padding {
            PaddingSpec::Pkcs1 { hash } => self.key.verify(pkcs1_scheme(hash), &hashed, signature),
            PaddingSpec::Pss { hash, salt_len, .. } => {
                self.key
                    .verify(pss_scheme(hash, salt_len), &hashed, signature)
            }
        };
        result.map_err(|_| Error::InvalidSignature)
    }
}
