//! Lenient number decoding.
//!
//! Counts reach us as JSON ints, floats, or strings (DOM `dataset` values are
//! always strings), depending on which endpoint or attribute produced them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Non-negative integer from an int, a float (rounded) or a numeric string.
pub fn to_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
        }
        _ => None,
    }
}

pub fn to_u32(v: &Value) -> Option<u32> {
    to_u64(v).and_then(|n| u32::try_from(n).ok())
}

pub fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Value::deserialize(d)?;
    to_u32(&v).ok_or_else(|| serde::de::Error::custom(format!("not a count: {v}")))
}

pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = Value::deserialize(d)?;
    to_u64(&v).ok_or_else(|| serde::de::Error::custom(format!("not a count: {v}")))
}

/// Identifier that may arrive as a string or a number.
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        v => Err(serde::de::Error::custom(format!("not an id: {v}"))),
    }
}

/// Like [`u32`], but absent, null and empty strings decode to `None`.
pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let v = Value::deserialize(d)?;
    match v {
        Value::Null => Ok(None),
        Value::String(ref s) if s.trim().is_empty() => Ok(None),
        _ => to_u32(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("not a count: {v}"))),
    }
}
