/// Hex-encoded BLAKE3 digest of an artifact payload.
///
/// Used for diagnostics (listing, collision logging); artifacts are keyed by
/// name, never by digest.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}
