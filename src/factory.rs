//! Builds signers and verifiers from validated keys.

use crate::config::ManagerConfig;
use crate::error::Error;
use crate::provider::{RsaPrivateParts, RsaProvider, Signer, Verifier};
use crate::resolver::resolve_padding;
use crate::types::{PrivateKey, PublicKey};
use crate::validation::{validate_private_key, validate_public_key};

/// Validate `key` and bind it with its algorithm's padding into a verifier.
///
/// # Errors
///
/// Returns any [`validate_public_key`] error, or
/// [`Error::ProviderFailure`] if the provider cannot load the key.
pub fn create_verifier<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    key: &PublicKey,
) -> Result<Box<dyn Verifier>, Error> {
    validate_public_key(provider, config, key)?;
    let padding = resolve_padding(key.algorithm())?;
    provider.build_verifier(key.n(), key.e(), padding)
}

/// Validate `key` and bind it with its algorithm's padding into a signer.
///
/// # Errors
///
/// Returns any [`validate_private_key`] error, or
/// [`Error::ProviderFailure`] if the provider rejects the private components.
pub fn create_signer<P: RsaProvider + ?Sized>(
    provider: &P,
    config: &ManagerConfig,
    key: &PrivateKey,
) -> Result<Box<dyn Signer>, Error> {
    validate_private_key(provider, config, key)?;
    let public_key = key.public_key();
    let padding = resolve_padding(public_key.algorithm())?;
    provider.build_signer(
        RsaPrivateParts {
            n: public_key.n(),
            e: public_key.e(),
            d: key.d(),
            p: key.p(),
            q: key.q(),
            dp: key.dp(),
            dq: key.dq(),
        },
        padding,
    )
}
