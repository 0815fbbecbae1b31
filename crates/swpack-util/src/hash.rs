/// Hash a sequence of byte chunks as if they were one concatenated buffer.
///
/// Returns the hex-encoded BLAKE3 digest.
#[must_use]
pub fn blake3_concat<I, B>(chunks: I) -> String
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = blake3::Hasher::new();
    for chunk in chunks {
        hasher.update(chunk.as_ref());
    }
    hasher.finalize().to_hex().to_string()
}

/// Truncate a hex digest to at most `len` characters.
#[must_use]
pub fn short_hex(digest: &str, len: usize) -> &str {
    // Hex digests are ASCII, so any byte index is a char boundary.
    &digest[..len.min(digest.len())]
}
