//! Stable JSON rendering of decoded configurations
//!
//! The same hyperparameters always render to the same bytes, and so to the
//! same `config_hash`.

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer};
use std::io::Write;

use crate::config::ConfigNode;

/// Write `value` as two-space indented JSON.
///
/// Key order comes from the value itself: configuration kwargs and
/// hyperparameters are `BTreeMap`s and `serde_json::Map` is sorted without
/// `preserve_order`, so no re-sorting pass is needed.
pub fn write_canonical_json<T, W>(writer: W, value: &T) -> Result<(), serde_json::Error>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"  "));
    value.serialize(&mut serializer)
}

pub fn canonical_json_string<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut buffer = Vec::new();
    write_canonical_json(&mut buffer, value)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// BLAKE3 hex digest of a configuration's canonical JSON.
pub fn config_hash(node: &ConfigNode) -> Result<String, serde_json::Error> {
    let canonical = canonical_json_string(node)?;
    Ok(hex::encode(blake3::hash(canonical.as_bytes()).as_bytes()))
}
