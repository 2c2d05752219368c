use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed collection data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a collection blob into its records.
///
/// An absent or blank blob is "no data yet" and decodes to an empty
/// collection. A present, malformed blob is corruption and is reported as an
/// error instead of being silently read as empty.
pub fn decode<T: DeserializeOwned>(raw: Option<&str>) -> Result<Vec<T>, CodecError> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) if text.trim().is_empty() => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}

/// Encode a collection back to its JSON array blob text.
pub fn encode<T: Serialize>(items: &[T]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(items)?)
}
