use sha2::{Digest, Sha256};

use crate::model::phrase::Phrase;

/// SHA-256 over the serialized phrases, in order. Identical pack input gives
/// an identical fingerprint.
pub fn fingerprint(phrases: &[Phrase]) -> String {
    let mut hasher = Sha256::new();
    for p in phrases {
        if let Ok(bytes) = serde_json::to_vec(p) {
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
