//! Compact JWS tokens signed with RSA keys.
//!
//! A token is `header.payload.signature`, each part unpadded base64url. The
//! header names the key's algorithm and, optionally, a key id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::claims::RawJwt;
use crate::encoding::{b64url_decode, b64url_encode};
use crate::error::Error;
use crate::manager::{KeyManager, SignKeyManager, VerifyKeyManager};
use crate::provider::{RsaProvider, Signer, Verifier};
use crate::types::{Algorithm, PrivateKey, PublicKey};
use crate::validator::JwtValidator;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default, skip_serializing)]
    crit: Option<Value>,
}

fn decode_part(part: &str, what: &str) -> Result<Vec<u8>, Error> {
    b64url_decode(part).map_err(|e| Error::JwtInvalid(format!("invalid {} encoding: {}", what, e)))
}

/// Signs claim sets into compact tokens.
pub struct JwtSigner {
    signer: Box<dyn Signer>,
    algorithm: Algorithm,
    kid: Option<String>,
}

impl JwtSigner {
    /// Validate `key` with `manager` and bind it into a token signer.
    pub fn new<P: RsaProvider>(manager: &SignKeyManager<P>, key: &PrivateKey) -> Result<Self, Error> {
        Ok(Self {
            signer: manager.create_primitive(key)?,
            algorithm: key.public_key().algorithm(),
            kid: None,
        })
    }

    /// Put `kid` into the header of every token.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn sign_and_encode(&self, jwt: &RawJwt) -> Result<String, Error> {
        let header = Header {
            alg: self.algorithm.as_str().to_string(),
            kid: self.kid.clone(),
            crit: None,
        };
        let signing_input = format!(
            "{}.{}",
            b64url_encode(serde_json::to_string(&header)?.as_bytes()),
            b64url_encode(jwt.to_json()?.as_bytes())
        );
        let signature = self.signer.sign(signing_input.as_bytes())?;
        Ok(format!("{}.{}", signing_input, b64url_encode(&signature)))
    }
}

/// Verifies compact tokens and validates their claims.
pub struct JwtVerifier {
    verifier: Box<dyn Verifier>,
    algorithm: Algorithm,
    kid: Option<String>,
}

impl JwtVerifier {
    /// Validate `key` with `manager` and bind it into a token verifier.
    pub fn new<P: RsaProvider>(manager: &VerifyKeyManager<P>, key: &PublicKey) -> Result<Self, Error> {
        Ok(Self {
            verifier: manager.create_primitive(key)?,
            algorithm: key.algorithm(),
            kid: None,
        })
    }

    /// Require tokens that carry a `kid` to carry this one.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Check the signature, then the header, then the claims.
    pub fn verify_and_decode(&self, token: &str, validator: &JwtValidator) -> Result<RawJwt, Error> {
        let parts: Vec<&str> = token.split('.').collect();
        let (header_b64, payload_b64, signature_b64) = match parts.as_slice() {
            [header, payload, signature] => (*header, *payload, *signature),
            _ => {
                return Err(Error::JwtInvalid(format!(
                    "expected 3 token parts, found {}",
                    parts.len()
                )))
            }
        };

        let signature = b64url_decode(signature_b64).map_err(|_| Error::InvalidSignature)?;
        let signing_input_len = header_b64.len() + 1 + payload_b64.len();
        self.verifier
            .verify(&signature, token[..signing_input_len].as_bytes())
            .map_err(|err| {
                debug!(algorithm = %self.algorithm, "token signature rejected");
                err
            })?;

        let header: Header = serde_json::from_slice(&decode_part(header_b64, "header")?)
            .map_err(|e| Error::JwtInvalid(format!("invalid header: {}", e)))?;
        if header.crit.is_some() {
            return Err(Error::JwtInvalid("crit header is not supported".to_string()));
        }
        if header.alg != self.algorithm.as_str() {
            return Err(Error::JwtInvalid(format!(
                "header algorithm {} does not match key algorithm {}",
                header.alg, self.algorithm
            )));
        }
        if let (Some(expected), Some(found)) = (&self.kid, &header.kid) {
            if expected != found {
                return Err(Error::JwtInvalid(format!(
                    "kid {} does not match expected {}",
                    found, expected
                )));
            }
        }

        let jwt = RawJwt::from_json(&decode_part(payload_b64, "payload")?)?;
        validator.validate(&jwt)?;
        Ok(jwt)
    }
}
