//! Content hashing for stored images.

use blake3::Hasher as Blake3Hasher;

/// Generate a BLAKE3 hex digest of `data`.
///
/// Stored images use this as their ETag so the retrieval endpoint can answer
/// conditional requests without re-reading the payload.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Blake3Hasher::new();
    hasher.update(data);
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_consistency() {
        let data = b"packshot";
        assert_eq!(content_hash(data), content_hash(data));
        assert_eq!(content_hash(data).len(), 64);
    }

    #[test]
    fn test_content_hash_differs_by_content() {
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }
}
