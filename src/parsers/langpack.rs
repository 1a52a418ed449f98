use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PackError, Result};
use crate::model::entry::{PackRecord, RawEntry};

/// Decodes chunk bytes to text.
///
/// A BOM wins; otherwise valid UTF-8 is taken as is and anything else goes
/// through chardetng. Bytes that do not decode cleanly in the chosen
/// encoding are a [`PackError::Decode`].
pub fn decode(name: &str, bytes: &[u8]) -> Result<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(PackError::Decode(name.to_string()));
        }
        return Ok(text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    // Not UTF-8, so keep it out of the guess.
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, false);

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(PackError::Decode(name.to_string()));
    }

    debug!("chunk {name} decoded as {}", encoding.name());
    Ok(text.into_owned())
}

/// Parses a chunk into entries.
///
/// The chunk itself must be a JSON array; a malformed record inside it is
/// skipped with a warning so one bad row never drops a whole pack.
pub fn parse(name: &str, text: &str) -> Result<Vec<RawEntry>> {
    let arr: Vec<Value> = serde_json::from_str(text).map_err(|source| PackError::Json {
        path: name.to_string(),
        source,
    })?;

    let mut entries: Vec<RawEntry> = Vec::with_capacity(arr.len());

    for (i, v) in arr.into_iter().enumerate() {
        match serde_json::from_value::<PackRecord>(v) {
            Ok(r) => entries.push(RawEntry::from(r)),
            Err(e) => warn!("{name}: skipping invalid record at index {i}: {e}"),
        }
    }

    Ok(entries)
}

pub fn decode_and_parse(name: &str, bytes: &[u8]) -> Result<Vec<RawEntry>> {
    let text = decode(name, bytes)?;
    parse(name, &text)
}
