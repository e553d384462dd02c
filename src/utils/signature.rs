use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `query` keyed with `secret`.
pub fn create_signature(query: &str, secret: &str) -> String {
    // HMAC accepts keys of any length, so this never fails
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn build_query(params: &[(&str, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Appends `timestamp` and a `signature` covering everything before it.
pub fn sign_query(params: &[(&str, String)], secret: &str, timestamp_ms: i64) -> String {
    let mut query = build_query(params);
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(&format!("timestamp={}", timestamp_ms));

    let signature = create_signature(&query, secret);
    format!("{}&signature={}", query, signature)
}

pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
