//! Claim validation for verified tokens.
//!
//! - An expected issuer/subject must be present and equal. Without one, a
//!   token carrying that claim is rejected unless the claim is ignored.
//! - An expected audience must be among the token's audiences. Without one,
//!   a token with audiences is rejected unless audiences are ignored.
//! - `exp` and `nbf` are checked against the current time, or `fixed_now`,
//!   allowing up to `clock_skew` (at most ten minutes) of leeway.

use chrono::{DateTime, Duration, Utc};

use crate::claims::RawJwt;
use crate::error::Error;

/// Largest permitted clock skew, in minutes.
pub const MAX_CLOCK_SKEW_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct JwtValidator {
    expected_issuer: Option<String>,
    expected_subject: Option<String>,
    expected_audience: Option<String>,
    ignore_issuer: bool,
    ignore_subject: bool,
    ignore_audiences: bool,
    clock_skew: Duration,
    fixed_now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct JwtValidatorBuilder {
    expected_issuer: Option<String>,
    expected_subject: Option<String>,
    expected_audience: Option<String>,
    ignore_issuer: bool,
    ignore_subject: bool,
    ignore_audiences: bool,
    clock_skew: Option<Duration>,
    fixed_now: Option<DateTime<Utc>>,
}

impl JwtValidatorBuilder {
    pub fn expect_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    pub fn expect_subject(mut self, subject: impl Into<String>) -> Self {
        self.expected_subject = Some(subject.into());
        self
    }

    pub fn expect_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    pub fn ignore_issuer(mut self) -> Self {
        self.ignore_issuer = true;
        self
    }

    pub fn ignore_subject(mut self) -> Self {
        self.ignore_subject = true;
        self
    }

    pub fn ignore_audiences(mut self) -> Self {
        self.ignore_audiences = true;
        self
    }

    pub fn clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = Some(skew);
        self
    }

    /// Validate against `now` instead of the system clock.
    pub fn fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn build(self) -> Result<JwtValidator, Error> {
        if self.expected_issuer.is_some() && self.ignore_issuer {
            return Err(Error::Config(
                "expected_issuer and ignore_issuer cannot be used together".to_string(),
            ));
        }
        if self.expected_subject.is_some() && self.ignore_subject {
            return Err(Error::Config(
                "expected_subject and ignore_subject cannot be used together".to_string(),
            ));
        }
        if self.expected_audience.is_some() && self.ignore_audiences {
            return Err(Error::Config(
                "expected_audience and ignore_audiences cannot be used together".to_string(),
            ));
        }

        let clock_skew = self.clock_skew.unwrap_or_else(Duration::zero);
        if clock_skew > Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
            return Err(Error::Config(format!(
                "clock skew too large, max is {} minutes",
                MAX_CLOCK_SKEW_MINUTES
            )));
        }
        if clock_skew < Duration::zero() {
            return Err(Error::Config("clock skew must not be negative".to_string()));
        }

        Ok(JwtValidator {
            expected_issuer: self.expected_issuer,
            expected_subject: self.expected_subject,
            expected_audience: self.expected_audience,
            ignore_issuer: self.ignore_issuer,
            ignore_subject: self.ignore_subject,
            ignore_audiences: self.ignore_audiences,
            clock_skew,
            fixed_now: self.fixed_now,
        })
    }
}

fn check_expected(
    claim: &str,
    expected: Option<&str>,
    found: Option<&str>,
    ignore: bool,
) -> Result<(), Error> {
    match (expected, found) {
        (Some(expected), None) => Err(Error::JwtInvalid(format!(
            "missing expected {} {}",
            claim, expected
        ))),
        (Some(expected), Some(found)) if expected != found => Err(Error::JwtInvalid(format!(
            "expected {} {}, but got {}",
            claim, expected, found
        ))),
        (None, Some(_)) if !ignore => Err(Error::JwtInvalid(format!(
            "token has {} set, but validator not",
            claim
        ))),
        _ => Ok(()),
    }
}

impl JwtValidator {
    pub fn builder() -> JwtValidatorBuilder {
        JwtValidatorBuilder::default()
    }

    pub fn expected_issuer(&self) -> Option<&str> {
        self.expected_issuer.as_deref()
    }

    pub fn expected_subject(&self) -> Option<&str> {
        self.expected_subject.as_deref()
    }

    pub fn expected_audience(&self) -> Option<&str> {
        self.expected_audience.as_deref()
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    pub fn fixed_now(&self) -> Option<DateTime<Utc>> {
        self.fixed_now
    }

    /// Validate the claims of a token whose signature has already been checked.
    pub fn validate(&self, jwt: &RawJwt) -> Result<(), Error> {
        let now = self.fixed_now.unwrap_or_else(Utc::now);

        if let Some(expiration) = jwt.expiration() {
            if expiration <= now - self.clock_skew {
                return Err(Error::JwtInvalid(format!(
                    "token has expired since {}",
                    expiration
                )));
            }
        }
        if let Some(not_before) = jwt.not_before() {
            if not_before > now + self.clock_skew {
                return Err(Error::JwtInvalid(format!(
                    "token cannot be used before {}",
                    not_before
                )));
            }
        }

        check_expected(
            "issuer",
            self.expected_issuer(),
            jwt.issuer(),
            self.ignore_issuer,
        )?;
        check_expected(
            "subject",
            self.expected_subject(),
            jwt.subject(),
            self.ignore_subject,
        )?;

        match &self.expected_audience {
            Some(expected) => {
                if !jwt.audiences().contains(&expected.as_str()) {
                    return Err(Error::JwtInvalid(format!(
                        "missing expected audience {}",
                        expected
                    )));
                }
            }
            None => {
                if jwt.has_audiences() && !self.ignore_audiences {
                    return Err(Error::JwtInvalid(
                        "token has audience set, but validator not".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
