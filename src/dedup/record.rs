//! Telemetry record decoding.
//!
//! The client encodes each record as base64 over a pipe-delimited string:
//! `type|field2|field3|payload`. Only the base64 layer can fail; the text
//! layer is decoded lossily and short records pad out with empty segments so
//! type dispatch and empty-payload handling stay deterministic.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

/// A decoded telemetry record.
///
/// Produced fresh per request and owned by the handling call; the payload is
/// the only segment the admission filter compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// Record type tag, drives discardable-type dispatch.
    pub record_type: String,
    pub field2: String,
    pub field3: String,
    /// Free-form payload compared for duplicate suppression.
    pub payload: String,
}

/// Decode failure. Callers must forward the raw request unconditionally on
/// this error rather than reporting it to the client.
#[derive(Debug, Error)]
#[error("invalid base64 in DATA parameter")]
pub struct DecodeError;

/// Decode a `DATA` query parameter into a [`GameRecord`].
///
/// Invalid UTF-8 inside a valid base64 envelope is replaced, not rejected;
/// only the base64 layer signals failure.
pub fn decode(data: &str) -> Result<GameRecord, DecodeError> {
    let bytes = BASE64.decode(data).map_err(|_| DecodeError)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut segments = text.splitn(4, '|');
    let mut next = || segments.next().unwrap_or_default().to_string();

    Ok(GameRecord {
        record_type: next(),
        field2: next(),
        field3: next(),
        payload: next(),
    })
}
