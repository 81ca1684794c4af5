#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use knowledge_core::Credential;
use serde_json::{json, Map, Value};

pub const NOW_SECS: i64 = 1_700_000_000;

/// Unsigned compact credential carrying `sub`, `roles` and optional `exp`.
pub fn credential(subject: &str, roles: &[&str], exp: Option<i64>) -> Credential {
    let mut payload = Map::new();
    payload.insert("sub".to_string(), json!(subject));
    payload.insert("roles".to_string(), json!(roles));
    if let Some(exp) = exp {
        payload.insert("exp".to_string(), json!(exp));
    }
    credential_from_payload(&Value::Object(payload))
}

pub fn credential_from_payload(payload: &Value) -> Credential {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    Credential::new(format!("{header}.{body}.c2lnbmF0dXJl"))
}

/// Credential for `roles` that expires one hour after `NOW_SECS`.
pub fn valid_credential(roles: &[&str]) -> Credential {
    credential("writer@example.com", roles, Some(NOW_SECS + 3_600))
}
