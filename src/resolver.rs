//! Algorithm to hash/padding resolution.
//!
//! Every JWT RSA algorithm name fixes its hash function. For PSS the MGF1 hash
//! is the signature hash and the salt is as long as the digest; none of these
//! can be configured independently.

use crate::error::Error;
use crate::types::{Algorithm, AlgorithmFamily, HashKind};

/// Padding parameters handed to the RSA provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingSpec {
    Pkcs1 {
        hash: HashKind,
    },
    Pss {
        hash: HashKind,
        mgf1_hash: HashKind,
        salt_len: usize,
    },
}

impl PaddingSpec {
    /// Signature hash.
    pub fn hash(&self) -> HashKind {
        match self {
            PaddingSpec::Pkcs1 { hash } | PaddingSpec::Pss { hash, .. } => *hash,
        }
    }
}

/// Return the hash bound to `algorithm`.
pub fn resolve_hash(algorithm: Algorithm) -> Result<HashKind, Error> {
    match algorithm {
        Algorithm::Rs256 | Algorithm::Ps256 => Ok(HashKind::Sha256),
        Algorithm::Rs384 | Algorithm::Ps384 => Ok(HashKind::Sha384),
        Algorithm::Rs512 | Algorithm::Ps512 => Ok(HashKind::Sha512),
        Algorithm::Unknown => Err(Error::UnsupportedAlgorithm(algorithm.to_string())),
    }
}

/// PSS salt length in bytes for `algorithm`.
pub fn resolve_salt_len(algorithm: Algorithm) -> Result<usize, Error> {
    match algorithm.family() {
        Some(AlgorithmFamily::Pss) => Ok(resolve_hash(algorithm)?.output_len()),
        _ => Err(Error::UnsupportedAlgorithm(format!(
            "{} is not a PSS algorithm",
            algorithm
        ))),
    }
}

/// Full padding parameters for `algorithm`.
pub fn resolve_padding(algorithm: Algorithm) -> Result<PaddingSpec, Error> {
    let hash = resolve_hash(algorithm)?;
    match algorithm.family() {
        Some(AlgorithmFamily::Pkcs1) => Ok(PaddingSpec::Pkcs1 { hash }),
        Some(AlgorithmFamily::Pss) => Ok(PaddingSpec::Pss {
            hash,
            mgf1_hash: hash,
            salt_len: hash.output_len(),
        }),
        None => Err(Error::UnsupportedAlgorithm(algorithm.to_string())),
    }
}
