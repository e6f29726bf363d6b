//! Key manager configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::provider::MIN_MODULUS_BITS;

/// How much of a stored private key is re-checked before a signer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateKeyCheck {
    /// Versions, non-empty components and the public key policy.
    #[default]
    Structural,
    /// Everything in `Structural`, plus `n == p * q` and both CRT exponents.
    Full,
}

/// Policy applied by the key managers on top of the provider's own checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Smallest modulus accepted. Can raise the provider floor, never lower it.
    pub min_modulus_bits: usize,
    pub private_key_check: PrivateKeyCheck,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            min_modulus_bits: MIN_MODULUS_BITS,
            private_key_check: PrivateKeyCheck::Structural,
        }
    }
}

impl ManagerConfig {
    /// Configuration that re-verifies private key arithmetic on every use.
    pub fn strict() -> Self {
        Self {
            private_key_check: PrivateKeyCheck::Full,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.min_modulus_bits < MIN_MODULUS_BITS {
            return Err(Error::Config(format!(
                "min_modulus_bits {} is below the floor of {}",
                self.min_modulus_bits, MIN_MODULUS_BITS
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
