//! JSON Web Key export/import and key identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::digest;
use crate::encoding::{b64url_decode, b64url_encode, trim_leading_zeros};
use crate::error::Error;
use crate::types::{Algorithm, HashKind, PublicKey, KEY_VERSION};

/// An RSA public key in JWK form (RFC 7517).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    pub n: String,
    pub e: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PublicKey {
    /// Export as a signing JWK. Integers are written without leading zeros.
    pub fn to_jwk(&self, kid: Option<&str>) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            alg: Some(self.algorithm().as_str().to_string()),
            n: b64url_encode(trim_leading_zeros(self.n())),
            e: b64url_encode(trim_leading_zeros(self.e())),
            key_use: Some("sig".to_string()),
            kid: kid.map(str::to_string),
        }
    }

    /// Import a signing JWK. The key still needs validating before use.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, Error> {
        if jwk.kty != "RSA" {
            return Err(Error::InvalidKey(format!("unsupported kty {}", jwk.kty)));
        }
        if let Some(key_use) = &jwk.key_use {
            if key_use != "sig" {
                return Err(Error::InvalidKey(format!("unsupported use {}", key_use)));
            }
        }
        let algorithm: Algorithm = jwk
            .alg
            .as_deref()
            .ok_or_else(|| Error::InvalidKey("missing alg".to_string()))?
            .parse()?;

        Ok(PublicKey::new(
            KEY_VERSION,
            b64url_decode(&jwk.n)?,
            b64url_decode(&jwk.e)?,
            algorithm,
        ))
    }
}

/// RFC 7638 SHA-256 thumbprint. Depends only on the modulus and exponent.
pub fn thumbprint(key: &PublicKey) -> Result<Vec<u8>, Error> {
    let jwk = key.to_jwk(None);
    let mut members = BTreeMap::new();
    members.insert("e", jwk.e.as_str());
    members.insert("kty", jwk.kty.as_str());
    members.insert("n", jwk.n.as_str());
    let canonical = serde_json::to_string(&members)?;
    Ok(digest(HashKind::Sha256, canonical.as_bytes()))
}

/// Thumbprint as unpadded base64url, suitable for a `kid`.
pub fn thumbprint_b64(key: &PublicKey) -> Result<String, Error> {
    Ok(b64url_encode(&thumbprint(key)?))
}

/// Thumbprint as `sha256:<hex>`.
pub fn fingerprint(key: &PublicKey) -> Result<String, Error> {
    Ok(format!("sha256:{}", hex::encode(thumbprint(key)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_jwk_roundtrip() {
        let key = testing::private_key(Algorithm::Ps256);
        let public_key = key.public_key();
        let jwk = public_key.to_jwk(Some("key-1"));
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg.as_deref(), Some("PS256"));
        assert_eq!(jwk.e, "AQAB");
        assert_eq!(jwk.key_use.as_deref(), Some("sig"));

        let json = jwk.to_json().unwrap();
        assert!(json.contains(r#""use":"sig""#));
        let parsed = Jwk::from_json(&json).unwrap();
        assert_eq!(parsed, jwk);

        let imported = PublicKey::from_jwk(&parsed).unwrap();
        assert_eq!(imported.algorithm(), Algorithm::Ps256);
        assert_eq!(imported.e(), public_key.e());
        assert_eq!(
            trim_leading_zeros(imported.n()),
            trim_leading_zeros(public_key.n())
        );
    }

    #[test]
    fn test_from_jwk_rejections() {
        let key = testing::private_key(Algorithm::Rs256);
        let jwk = key.public_key().to_jwk(None);

        let wrong_kty = Jwk {
            kty: "EC".to_string(),
            ..jwk.clone()
        };
        assert!(matches!(
            PublicKey::from_jwk(&wrong_kty),
            Err(Error::InvalidKey(_))
        ));

        let encryption = Jwk {
            key_use: Some("enc".to_string()),
            ..jwk.clone()
        };
        assert!(matches!(
            PublicKey::from_jwk(&encryption),
            Err(Error::InvalidKey(_))
        ));

        let no_alg = Jwk {
            alg: None,
            ..jwk.clone()
        };
        assert!(PublicKey::from_jwk(&no_alg).is_err());

        let ecdsa = Jwk {
            alg: Some("ES256".to_string()),
            ..jwk.clone()
        };
        assert!(matches!(
            PublicKey::from_jwk(&ecdsa),
            Err(Error::UnsupportedAlgorithm(_))
        ));

        let bad_n = Jwk {
            n: "not base64!".to_string(),
            ..jwk
        };
        assert!(matches!(
            PublicKey::from_jwk(&bad_n),
            Err(Error::Base64(_))
        ));
    }

    #[test]
    fn test_thumbprint_is_over_canonical_members() {
        let key = testing::private_key(Algorithm::Rs384);
        let jwk = key.public_key().to_jwk(Some("ignored"));
        let canonical = format!(r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#, jwk.e, jwk.n);
        let expected = digest(HashKind::Sha256, canonical.as_bytes());
        assert_eq!(thumbprint(key.public_key()).unwrap(), expected);
        assert_eq!(expected.len(), 32);
    }

    #[test]
    fn test_thumbprint_ignores_algorithm_and_leading_zeros() {
        let key = testing::private_key(Algorithm::Rs256);
        let pk = key.public_key();
        let mut padded_n = vec![0u8];
        padded_n.extend_from_slice(pk.n());
        let relabeled = PublicKey::new(0, padded_n, pk.e().to_vec(), Algorithm::Ps512);
        assert_eq!(thumbprint(pk).unwrap(), thumbprint(&relabeled).unwrap());

        let other = testing::other_private_key(Algorithm::Rs256);
        assert_ne!(
            thumbprint(pk).unwrap(),
            thumbprint(other.public_key()).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_format() {
        let key = testing::private_key(Algorithm::Ps256);
        let fp = fingerprint(key.public_key()).unwrap();
        assert!(fp.starts_with("sha256:"));
        assert_eq!(fp.len(), "sha256:".len() + 64);
        assert_eq!(
            fp,
            format!("sha256:{}", hex::encode(thumbprint(key.public_key()).unwrap()))
        );
        assert_eq!(thumbprint_b64(key.public_key()).unwrap().len(), 43);
    }
}
