use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of a signing identity.
///
/// Used both to match `sha256:` expected signatures and to report an observed signature
/// without echoing its raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}
