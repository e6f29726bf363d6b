//! Unverified JWT claim sets.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;

const REGISTERED_CLAIMS: [&str; 7] = ["iss", "sub", "aud", "jti", "exp", "nbf", "iat"];

/// Largest NumericDate accepted, 9999-12-31T23:59:59Z.
pub const MAX_NUMERIC_DATE: f64 = 253_402_300_799.0;

// Whole seconds are written as integers.
fn serialize_numeric_date<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(seconds) if seconds.fract() == 0.0 => serializer.serialize_i64(*seconds as i64),
        Some(seconds) => serializer.serialize_f64(*seconds),
        None => serializer.serialize_none(),
    }
}

fn check_numeric_date(claim: &str, value: Option<f64>) -> Result<(), Error> {
    match value {
        Some(seconds) if !(0.0..=MAX_NUMERIC_DATE).contains(&seconds) => Err(Error::JwtInvalid(
            format!("{} {} is not a valid NumericDate", claim, seconds),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum Audiences {
    Single(String),
    Many(Vec<String>),
}

/// A JWT claim set. Timestamps are NumericDate seconds, possibly fractional,
/// within `0..=MAX_NUMERIC_DATE`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawJwt {
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aud: Option<Audiences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_numeric_date"
    )]
    exp: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_numeric_date"
    )]
    nbf: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_numeric_date"
    )]
    iat: Option<f64>,
    #[serde(flatten)]
    custom: Map<String, Value>,
}

fn to_datetime(seconds: Option<f64>) -> Option<DateTime<Utc>> {
    seconds.and_then(|s| {
        let nanos = (s.fract() * 1e9) as u32;
        Utc.timestamp_opt(s.trunc() as i64, nanos).single()
    })
}

impl RawJwt {
    pub fn builder() -> RawJwtBuilder {
        RawJwtBuilder::default()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    pub fn jwt_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    pub fn has_audiences(&self) -> bool {
        self.aud.is_some()
    }

    /// Audiences, whether the token carried a single string or a list.
    pub fn audiences(&self) -> Vec<&str> {
        match &self.aud {
            Some(Audiences::Single(aud)) => vec![aud.as_str()],
            Some(Audiences::Many(auds)) => auds.iter().map(String::as_str).collect(),
            None => vec![],
        }
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.exp)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.nbf)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.iat)
    }

    /// A non-registered claim.
    pub fn custom_claim(&self, name: &str) -> Option<&Value> {
        self.custom.get(name)
    }

    pub fn custom_claim_names(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    fn check_numeric_dates(&self) -> Result<(), Error> {
        check_numeric_date("exp", self.exp)?;
        check_numeric_date("nbf", self.nbf)?;
        check_numeric_date("iat", self.iat)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a claim set from its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JwtInvalid`] if the payload is not a JSON claim set or
    /// a timestamp claim is negative or after year 9999.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let jwt: Self = serde_json::from_slice(json)
            .map_err(|e| Error::JwtInvalid(format!("invalid payload: {}", e)))?;
        jwt.check_numeric_dates()?;
        Ok(jwt)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawJwtBuilder {
    jwt: RawJwt,
    audiences: Vec<String>,
}

impl RawJwtBuilder {
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.jwt.iss = Some(issuer.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.jwt.sub = Some(subject.into());
        self
    }

    /// Add an audience. A single audience is encoded as a string, several as a list.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audiences.push(audience.into());
        self
    }

    pub fn jwt_id(mut self, id: impl Into<String>) -> Self {
        self.jwt.jti = Some(id.into());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.jwt.exp = Some(at.timestamp() as f64);
        self
    }

    pub fn not_before(mut self, at: DateTime<Utc>) -> Self {
        self.jwt.nbf = Some(at.timestamp() as f64);
        self
    }

    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.jwt.iat = Some(at.timestamp() as f64);
        self
    }

    pub fn claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.jwt.custom.insert(name.into(), value);
        self
    }

    /// Fails if a custom claim reuses a registered claim name or a timestamp
    /// is outside the NumericDate range.
    pub fn build(mut self) -> Result<RawJwt, Error> {
        self.jwt.check_numeric_dates()?;
        if let Some(name) = self
            .jwt
            .custom
            .keys()
            .find(|name| REGISTERED_CLAIMS.contains(&name.as_str()))
        {
            return Err(Error::JwtInvalid(format!(
                "{} is a registered claim and cannot be set as a custom claim",
                name
            )));
        }

        let mut audiences = std::mem::take(&mut self.audiences);
        self.jwt.aud = match audiences.len() {
            0 => None,
            1 => audiences.pop().map(Audiences::Single),
            _ => Some(Audiences::Many(audiences)),
        };
        Ok(self.jwt)
    }
}
