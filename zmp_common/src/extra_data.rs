//! The gateway hands back an opaque `extradata` blob with each transaction. Checkout embeds the internal order id in it
//! as a small JSON object, and callbacks recover the order from it.
use serde_json::{Map, Value};
use thiserror::Error;

pub const ORDER_REFERENCE_KEY: &str = "pk_order_id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtraDataError {
    #[error("The extra data blob is not correctly escaped: {0}")]
    MalformedEscape(String),
    #[error("The extra data blob is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("The extra data blob does not contain '{ORDER_REFERENCE_KEY}'")]
    MissingOrderReference,
    #[error("'{ORDER_REFERENCE_KEY}' must be a string or an integer, but was {0}")]
    InvalidOrderReference(String),
    #[error("'{ORDER_REFERENCE_KEY}' is empty")]
    EmptyOrderReference,
}

/// Builds the blob sent with the checkout payload.
pub fn encode_order_reference(order_id: &str) -> String {
    let mut map = Map::new();
    map.insert(ORDER_REFERENCE_KEY.to_string(), Value::String(order_id.to_string()));
    Value::Object(map).to_string()
}

/// Recovers the internal order id from a blob as delivered by the gateway. The blob may arrive query-escaped or as plain
/// JSON.
pub fn decode_order_reference(blob: &str) -> Result<String, ExtraDataError> {
    let trimmed = blob.trim();
    let json = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        // Escaped blobs arrive form-encoded: `+` is a space and a literal plus is `%2B`.
        let spaced = trimmed.replace('+', " ");
        urlencoding::decode(&spaced).map_err(|e| ExtraDataError::MalformedEscape(e.to_string()))?.into_owned()
    };
    let object = serde_json::from_str::<Map<String, Value>>(&json)
        .map_err(|e| ExtraDataError::MalformedJson(e.to_string()))?;
    let reference = object.get(ORDER_REFERENCE_KEY).ok_or(ExtraDataError::MissingOrderReference)?;
    let order_id = match reference {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.is_finite() => format!("{f:.0}"),
            _ => return Err(ExtraDataError::InvalidOrderReference(n.to_string())),
        },
        other => return Err(ExtraDataError::InvalidOrderReference(other.to_string())),
    };
    if order_id.is_empty() {
        return Err(ExtraDataError::EmptyOrderReference);
    }
    Ok(order_id)
}
