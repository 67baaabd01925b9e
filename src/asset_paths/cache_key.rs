use sha2::{Digest, Sha256};

use crate::models::CacheKey;

/// Number of hex characters kept from the URL digest.
pub const CACHE_KEY_LEN: usize = 8;

/// Derive the cache filename for a URL.
///
/// The key is the first eight hex characters of the SHA-256 digest of the UTF-8 encoded
/// URL. Two URLs whose digests share that prefix map to the same cache slot; the content is
/// not re-verified.
pub fn cache_key(url: &str) -> CacheKey {
    let digest = Sha256::digest(url.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(CACHE_KEY_LEN);
    CacheKey(encoded)
}
