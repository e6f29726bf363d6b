use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::b64url;
use crate::types::algorithm::Algorithm;

/// The only key record version this crate reads or writes.
pub const KEY_VERSION: u32 = 0;

/// Public exponent 65537 as big-endian bytes.
pub const F4: [u8; 3] = [0x01, 0x00, 0x01];

/// RSA public key bound to a JWT algorithm.
///
/// Integer fields are big-endian unsigned bytes without sign padding.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicKey {
    version: u32,
    #[serde(with = "b64url")]
    n: Vec<u8>,
    #[serde(with = "b64url")]
    e: Vec<u8>,
    algorithm: Algorithm,
}

impl PublicKey {
    pub fn new(version: u32, n: Vec<u8>, e: Vec<u8>, algorithm: Algorithm) -> Self {
        Self {
            version,
            n,
            e,
            algorithm,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Modulus.
    pub fn n(&self) -> &[u8] {
        &self.n
    }

    /// Public exponent.
    pub fn e(&self) -> &[u8] {
        &self.e
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("version", &self.version)
            .field("algorithm", &self.algorithm)
            .field("modulus_bits", &crate::encoding::bit_length(&self.n))
            .field("e", &hex::encode(&self.e))
            .finish()
    }
}

/// RSA private key with its embedded public key and CRT parameters.
///
/// Secret components are zeroized on drop and never printed by `Debug`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    version: u32,
    #[zeroize(skip)]
    public_key: PublicKey,
    #[serde(with = "b64url")]
    d: Vec<u8>,
    #[serde(with = "b64url")]
    p: Vec<u8>,
    #[serde(with = "b64url")]
    q: Vec<u8>,
    #[serde(with = "b64url")]
    dp: Vec<u8>,
    #[serde(with = "b64url")]
    dq: Vec<u8>,
}

impl PrivateKey {
    pub fn new(
        version: u32,
        public_key: PublicKey,
        d: Vec<u8>,
        p: Vec<u8>,
        q: Vec<u8>,
        dp: Vec<u8>,
        dq: Vec<u8>,
    ) -> Self {
        Self {
            version,
            public_key,
            d,
            p,
            q,
            dp,
            dq,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Private exponent.
    pub fn d(&self) -> &[u8] {
        &self.d
    }

    pub fn p(&self) -> &[u8] {
        &self.p
    }

    pub fn q(&self) -> &[u8] {
        &self.q
    }

    /// `d mod (p - 1)`
    pub fn dp(&self) -> &[u8] {
        &self.dp
    }

    /// `d mod (q - 1)`
    pub fn dq(&self) -> &[u8] {
        &self.dq
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("version", &self.version)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Parameters for generating a new key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFormat {
    pub algorithm: Algorithm,
    pub modulus_size_in_bits: u32,
    #[serde(with = "b64url")]
    pub public_exponent: Vec<u8>,
}

impl KeyFormat {
    pub fn new(algorithm: Algorithm, modulus_size_in_bits: u32, public_exponent: Vec<u8>) -> Self {
        Self {
            algorithm,
            modulus_size_in_bits,
            public_exponent,
        }
    }

    /// Format using the conventional public exponent 65537.
    pub fn with_f4(algorithm: Algorithm, modulus_size_in_bits: u32) -> Self {
        Self::new(algorithm, modulus_size_in_bits, F4.to_vec())
    }
}
