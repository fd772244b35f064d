//! Credential-derived identity fields for telemetry tagging.
//!
//! Tokens are JWTs; only the payload segment is decoded and no signature is
//! checked. The raw credential never leaves this module.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// JWT claim → telemetry field.
const IDENTITY_CLAIMS: &[(&str, &str)] = &[
    ("uid", "userId"),
    ("actid", "accountId"),
    ("aai", "appId"),
    ("rgn", "region"),
];

/// Extract identity fields from a raw credential.
///
/// Absent, malformed, or non-JWT credentials yield an empty map.
pub fn token_identity(raw: &str) -> HashMap<String, Value> {
    let mut fields = HashMap::new();

    let Some(payload) = raw.split('.').nth(1) else {
        return fields;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return fields;
    };
    let Ok(Value::Object(claims)) = serde_json::from_slice::<Value>(&bytes) else {
        return fields;
    };

    for (claim, field) in IDENTITY_CLAIMS {
        if let Some(value) = claims.get(*claim) {
            if !value.is_null() {
                fields.insert((*field).to_string(), value.clone());
            }
        }
    }
    fields
}
