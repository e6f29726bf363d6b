use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Key version {found} is not supported (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Unsupported JWT RSA algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Modulus is {bits} bits, at least {min} bits are required")]
    ModulusTooSmall { bits: usize, min: usize },

    #[error("Invalid public exponent: {0}")]
    InvalidExponent(String),

    #[error("Key generation failed: {0}")]
    GenerationFailed(String),

    /// Deliberately carries no detail about why verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("RSA provider failure: {0}")]
    ProviderFailure(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid JWT: {0}")]
    JwtInvalid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The tag identifying which kind of failure this is.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::VersionMismatch { .. } => ErrorCode::VersionMismatch,
            Error::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
            Error::ModulusTooSmall { .. } => ErrorCode::ModulusTooSmall,
            Error::InvalidExponent(_) => ErrorCode::InvalidExponent,
            Error::GenerationFailed(_) => ErrorCode::GenerationFailed,
            Error::InvalidSignature => ErrorCode::InvalidSignature,
            Error::ProviderFailure(_) => ErrorCode::ProviderFailure,
            Error::InvalidKey(_) => ErrorCode::InvalidKey,
            Error::JwtInvalid(_) => ErrorCode::JwtInvalid,
            Error::Config(_) => ErrorCode::Config,
            Error::Base64(_) | Error::Json(_) => ErrorCode::Malformed,
            Error::Io(_) => ErrorCode::Io,
        }
    }
}

impl From<rsa::Error> for Error {
    fn from(err: rsa::Error) -> Self {
        Error::ProviderFailure(err.to_string())
    }
}

/// Error codes for structured results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    VersionMismatch,
    UnsupportedAlgorithm,
    ModulusTooSmall,
    InvalidExponent,
    GenerationFailed,
    InvalidSignature,
    ProviderFailure,
    InvalidKey,
    JwtInvalid,
    Config,
    Malformed,
    Io,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::VersionMismatch => "VERSION_MISMATCH",
            ErrorCode::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            ErrorCode::ModulusTooSmall => "MODULUS_TOO_SMALL",
            ErrorCode::InvalidExponent => "INVALID_EXPONENT",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::ProviderFailure => "PROVIDER_FAILURE",
            ErrorCode::InvalidKey => "INVALID_KEY",
            ErrorCode::JwtInvalid => "JWT_INVALID",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Malformed => "MALFORMED",
            ErrorCode::Io => "IO",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_matches_variant() {
        assert_eq!(Error::InvalidSignature.code(), ErrorCode::InvalidSignature);
        assert_eq!(
            Error::ModulusTooSmall { bits: 512, min: 2048 }.code(),
            ErrorCode::ModulusTooSmall
        );
        assert_eq!(
            Error::VersionMismatch {
                expected: 0,
                found: 1
            }
            .code(),
            ErrorCode::VersionMismatch
        );
    }

    #[test]
    fn test_error_code_serde_matches_display() {
        for code in [
            ErrorCode::UnsupportedAlgorithm,
            ErrorCode::InvalidExponent,
            ErrorCode::GenerationFailed,
            ErrorCode::JwtInvalid,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code));
        }
    }

    #[test]
    fn test_invalid_signature_has_no_detail() {
        assert_eq!(Error::InvalidSignature.to_string(), "Invalid signature");
    }
}
