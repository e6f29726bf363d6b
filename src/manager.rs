//! Sign-side and verify-side key managers.
//!
//! Both expose the same capability surface through [`KeyManager`]: validate a
//! key, then turn it into a primitive. The sign side can also validate key
//! formats, create keys and hand out the public half.

use crate::config::ManagerConfig;
use crate::crypto::RustCryptoProvider;
use crate::error::Error;
use crate::factory::{create_signer, create_verifier};
use crate::generator::{generate_private_key, get_public_key};
use crate::provider::{RsaProvider, Signer, Verifier};
use crate::types::{Algorithm, AlgorithmFamily, KeyFormat, PrivateKey, PublicKey, KEY_VERSION};
use crate::validation::{validate_key_format, validate_private_key, validate_public_key};

pub const PRIVATE_KEY_TYPE: &str = "jwt-rsa-keys/PrivateKey";
pub const PUBLIC_KEY_TYPE: &str = "jwt-rsa-keys/PublicKey";

/// What kind of key material a manager handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMaterialType {
    AsymmetricPrivate,
    AsymmetricPublic,
}

/// Shared interface of the key managers.
pub trait KeyManager {
    type Key;
    type Primitive: ?Sized;

    fn key_type(&self) -> &'static str;

    fn version(&self) -> u32 {
        KEY_VERSION
    }

    fn key_material_type(&self) -> KeyMaterialType;

    fn validate_key(&self, key: &Self::Key) -> Result<(), Error>;

    /// Validate `key` and build its primitive.
    fn create_primitive(&self, key: &Self::Key) -> Result<Box<Self::Primitive>, Error>;
}

fn check_family(allowed: Option<AlgorithmFamily>, algorithm: Algorithm) -> Result<(), Error> {
    match allowed {
        Some(family) if algorithm.family() != Some(family) => Err(Error::UnsupportedAlgorithm(
            format!("{} is not accepted by a {:?} key manager", algorithm, family),
        )),
        _ => Ok(()),
    }
}

/// Manager for private keys and signers.
#[derive(Debug, Clone)]
pub struct SignKeyManager<P = RustCryptoProvider> {
    provider: P,
    config: ManagerConfig,
    family: Option<AlgorithmFamily>,
}

impl SignKeyManager<RustCryptoProvider> {
    pub fn new() -> Self {
        Self::with_provider(RustCryptoProvider)
    }
}

impl Default for SignKeyManager<RustCryptoProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: RsaProvider> SignKeyManager<P> {
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            config: ManagerConfig::default(),
            family: None,
        }
    }

    /// Replace the configuration. Fails if `config` does not validate.
    pub fn with_config(mut self, config: ManagerConfig) -> Result<Self, Error> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Only accept algorithms of `family`.
    pub fn restrict_to(mut self, family: AlgorithmFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn validate_key_format(&self, format: &KeyFormat) -> Result<(), Error> {
        check_family(self.family, format.algorithm)?;
        validate_key_format(&self.provider, &self.config, format)
    }

    /// Generate a new private key for `format`.
    pub fn create_key(&self, format: &KeyFormat) -> Result<PrivateKey, Error> {
        check_family(self.family, format.algorithm)?;
        generate_private_key(&self.provider, &self.config, format)
    }

    pub fn get_public_key(&self, key: &PrivateKey) -> PublicKey {
        get_public_key(key)
    }
}

impl<P: RsaProvider> KeyManager for SignKeyManager<P> {
    type Key = PrivateKey;
    type Primitive = dyn Signer;

    fn key_type(&self) -> &'static str {
        PRIVATE_KEY_TYPE
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPrivate
    }

    fn validate_key(&self, key: &PrivateKey) -> Result<(), Error> {
        check_family(self.family, key.public_key().algorithm())?;
        validate_private_key(&self.provider, &self.config, key)
    }

    fn create_primitive(&self, key: &PrivateKey) -> Result<Box<dyn Signer>, Error> {
        check_family(self.family, key.public_key().algorithm())?;
        create_signer(&self.provider, &self.config, key)
    }
}

/// Manager for public keys and verifiers.
#[derive(Debug, Clone)]
pub struct VerifyKeyManager<P = RustCryptoProvider> {
    provider: P,
    config: ManagerConfig,
    family: Option<AlgorithmFamily>,
}

impl VerifyKeyManager<RustCryptoProvider> {
    pub fn new() -> Self {
        Self::with_provider(RustCryptoProvider)
    }
}

impl Default for VerifyKeyManager<RustCryptoProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: RsaProvider> VerifyKeyManager<P> {
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            config: ManagerConfig::default(),
            family: None,
        }
    }

    /// Replace the configuration. Fails if `config` does not validate.
    pub fn with_config(mut self, config: ManagerConfig) -> Result<Self, Error> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Only accept algorithms of `family`.
    pub fn restrict_to(mut self, family: AlgorithmFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

impl<P: RsaProvider> KeyManager for VerifyKeyManager<P> {
    type Key = PublicKey;
    type Primitive = dyn Verifier;

    fn key_type(&self) -> &'static str {
        PUBLIC_KEY_TYPE
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPublic
    }

    fn validate_key(&self, key: &PublicKey) -> Result<(), Error> {
        check_family(self.family, key.algorithm())?;
        validate_public_key(&self.provider, &self.config, key)
    }

    fn create_primitive(&self, key: &PublicKey) -> Result<Box<dyn Verifier>, Error> {
        check_family(self.family, key.algorithm())?;
        create_verifier(&self.provider, &self.config, key)
    }
}
