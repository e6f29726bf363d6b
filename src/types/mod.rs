//! Record types shared by validators, the generator and the key managers.

pub mod algorithm;
pub mod keys;

pub use algorithm::{Algorithm, AlgorithmFamily, HashKind};
pub use keys::{KeyFormat, PrivateKey, PublicKey, F4, KEY_VERSION};
