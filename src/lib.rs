//! # jwt-rsa-keys
//!
//! RSA key management for JWT signatures.
//!
//! The crate validates, generates and loads RSA keys for the JWA algorithms
//! RS256, RS384, RS512 (RSASSA-PKCS1-v1_5) and PS256, PS384, PS512
//! (RSASSA-PSS), and turns validated keys into signing and verification
//! primitives. A compact JWT layer sits on top.
//!
//! ## Features
//!
//! - **Key Format Validation**: Algorithm, modulus floor and public exponent checks
//! - **Key Generation**: Fresh key pairs with CRT parameters, checked before use
//! - **Primitives**: Signers and verifiers whose padding is fixed by the key's algorithm
//! - **Key Managers**: Sign-side and verify-side managers with an optional family restriction
//! - **JWK Support**: Export, import, RFC 7638 thumbprints and `sha256:` fingerprints
//! - **JWT**: Claim sets, claim validation and compact token signing/verification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jwt_rsa_keys::{Algorithm, KeyFormat, KeyManager, SignKeyManager, Signer, Verifier, VerifyKeyManager};
//!
//! let sign = SignKeyManager::new();
//! let verify = VerifyKeyManager::new();
//!
//! // Generate a new key pair
//! let key = sign.create_key(&KeyFormat::with_f4(Algorithm::Ps256, 3072)).unwrap();
//! let public_key = sign.get_public_key(&key);
//!
//! // Sign some data
//! let signer = sign.create_primitive(&key).unwrap();
//! let signature = signer.sign(b"Hello, World!").unwrap();
//!
//! // Verify the signature
//! let verifier = verify.create_primitive(&public_key).unwrap();
//! assert!(verifier.verify(&signature, b"Hello, World!").is_ok());
//!
//! // Key ID
//! let key_id = jwt_rsa_keys::jwk::fingerprint(&public_key).unwrap();
//! println!("Key ID: {}", key_id);
//! ```
//!
//! ## Security
//!
//! - Moduli below 2048 bits are rejected, larger floors are configurable
//! - Public exponents must be odd, above 65536 and at most 32 bits
//! - The hash and padding of a primitive come only from the key's algorithm
//! - Private key material is zeroized on drop
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. [`Error::code`] gives a
//! stable machine-readable code for each failure.

pub mod claims;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod factory;
pub mod generator;
pub mod jwk;
pub mod jwt;
pub mod manager;
pub mod provider;
pub mod resolver;
pub mod types;
pub mod validation;
pub mod validator;

#[cfg(test)]
mod testing;

pub use claims::{RawJwt, RawJwtBuilder};
pub use config::{ManagerConfig, PrivateKeyCheck};
pub use crypto::RustCryptoProvider;
pub use error::{Error, ErrorCode};
pub use jwk::Jwk;
pub use jwt::{JwtSigner, JwtVerifier};
pub use manager::{KeyManager, KeyMaterialType, SignKeyManager, VerifyKeyManager};
pub use provider::{RsaProvider, Signer, Verifier};
pub use types::{Algorithm, AlgorithmFamily, HashKind, KeyFormat, PrivateKey, PublicKey, F4};
pub use validator::{JwtValidator, JwtValidatorBuilder};
