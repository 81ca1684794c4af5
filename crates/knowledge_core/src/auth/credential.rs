//! Bearer credential and unverified claim decoding.
//!
//! # Responsibility
//! - Hold the opaque compact credential string.
//! - Decode the payload segment into `Claims` for UI-level gating.
//!
//! # Invariants
//! - The signature segment is never inspected. Decoded claims are a UI hint
//!   only; any server-authoritative decision must be re-checked server side.
//! - Decoding never panics; every malformed shape yields `ClaimsError`.
//! - `Debug` output never contains the raw credential.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

const SEGMENT_COUNT: usize = 3;

static URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
static STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Opaque bearer credential (`header.payload.signature`).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// `Authorization` header value for this credential.
    pub fn bearer_header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decodes the payload segment without verifying the signature.
    pub fn decode_claims(&self) -> Result<Claims, ClaimsError> {
        let segments: Vec<&str> = self.0.trim().split('.').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(ClaimsError::SegmentCount(segments.len()));
        }

        let payload = segments[1];
        if payload.is_empty() {
            return Err(ClaimsError::EmptyPayload);
        }
        let bytes = URL_SAFE_LENIENT
            .decode(payload)
            .or_else(|_| STANDARD_LENIENT.decode(payload))
            .map_err(|_| ClaimsError::Encoding)?;
        let raw: RawClaims =
            serde_json::from_slice(&bytes).map_err(|err| ClaimsError::Payload(err.to_string()))?;

        Ok(Claims {
            subject: raw.sub,
            roles: raw.roles.unwrap_or_default().into_iter().collect(),
            expires_at: raw.exp.map(|exp| exp.floor() as i64),
        })
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<redacted; {} bytes>)", self.0.len())
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    roles: Option<Vec<String>>,
    #[serde(default)]
    exp: Option<f64>,
}

/// Claims read from the credential payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Claims {
    pub subject: Option<String>,
    pub roles: BTreeSet<String>,
    /// Unix epoch seconds.
    pub expires_at: Option<i64>,
}

impl Claims {
    /// Absent `exp` counts as expired.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now_secs,
            None => true,
        }
    }
}

/// Why a credential payload could not be read.
///
/// Callers treat every variant as "expired"; the detail only feeds logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    SegmentCount(usize),
    EmptyPayload,
    Encoding,
    Payload(String),
}

impl ClaimsError {
    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SegmentCount(_) => "segment_count",
            Self::EmptyPayload => "empty_payload",
            Self::Encoding => "payload_encoding",
            Self::Payload(_) => "payload_json",
        }
    }
}

impl Display for ClaimsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SegmentCount(count) => {
                write!(f, "credential must have {SEGMENT_COUNT} segments, got {count}")
            }
            Self::EmptyPayload => write!(f, "credential payload segment is empty"),
            Self::Encoding => write!(f, "credential payload is not valid base64"),
            Self::Payload(details) => write!(f, "credential payload is not valid claims json: {details}"),
        }
    }
}

impl Error for ClaimsError {}

#[cfg(test)]
mod tests {
    use super::{Claims, ClaimsError, Credential};
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use base64::Engine;

    fn credential_with_payload(payload: &str) -> Credential {
        Credential::new(format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.c2ln",
            URL_SAFE_NO_PAD.encode(payload.as_bytes())
        ))
    }

    #[test]
    fn decodes_subject_roles_and_expiry() {
        let claims = credential_with_payload(r#"{"sub":"ada","roles":["USER","ADMIN"],"exp":1700000000}"#)
            .decode_claims()
            .expect("claims should decode");
        assert_eq!(claims.subject.as_deref(), Some("ada"));
        assert!(claims.roles.contains("ADMIN"));
        assert_eq!(claims.expires_at, Some(1_700_000_000));
    }

    #[test]
    fn accepts_padded_standard_encoding() {
        let payload = STANDARD.encode(br#"{"roles":["USER"],"exp":10}"#);
        let claims = Credential::new(format!("h.{payload}.s"))
            .decode_claims()
            .expect("padded payload should decode");
        assert_eq!(claims.expires_at, Some(10));
    }

    #[test]
    fn fractional_expiry_is_floored() {
        let claims = credential_with_payload(r#"{"exp":99.9}"#)
            .decode_claims()
            .expect("claims should decode");
        assert_eq!(claims.expires_at, Some(99));
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = Credential::new("only.two").decode_claims().expect_err("two segments");
        assert_eq!(err, ClaimsError::SegmentCount(2));
    }

    #[test]
    fn rejects_non_base64_and_non_json_payloads() {
        let err = Credential::new("h.%%%.s").decode_claims().expect_err("bad base64");
        assert_eq!(err, ClaimsError::Encoding);

        let err = credential_with_payload("not json").decode_claims().expect_err("bad json");
        assert!(matches!(err, ClaimsError::Payload(_)));

        let err = credential_with_payload(r#"{"roles":"ADMIN"}"#)
            .decode_claims()
            .expect_err("roles must be an array");
        assert_eq!(err.code(), "payload_json");
    }

    #[test]
    fn missing_expiry_counts_as_expired() {
        let claims = Claims::default();
        assert!(claims.is_expired_at(0));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let claims = Claims {
            expires_at: Some(100),
            ..Claims::default()
        };
        assert!(claims.is_expired_at(100));
        assert!(!claims.is_expired_at(99));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let credential = Credential::new("secret.token.value");
        assert!(!format!("{credential:?}").contains("secret"));
    }
}
