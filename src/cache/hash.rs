//! Content-addressed cache fingerprints.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Compute the content fingerprint over a set of salient input fields.
///
/// The fields are hashed as length-prefixed segments so `["ab", "c"]` and
/// `["a", "bc"]` produce different digests. The result is the first 16 hex
/// characters of the SHA-256 digest.
///
/// # Examples
///
/// ```
/// use rubriq::cache::fingerprint;
///
/// let digest = fingerprint(["task-input", "model-x"]);
/// assert_eq!(digest.len(), 16);
/// assert_eq!(digest, fingerprint(["task-input", "model-x"]));
/// assert_ne!(digest, fingerprint(["task-input", "model-y"]));
/// ```
pub fn fingerprint<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for field in fields {
        let bytes = field.as_ref().as_bytes();
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(bytes);
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_truncated() {
        let a = fingerprint(["alpha", "beta"]);
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert_eq!(a, fingerprint(["alpha", "beta"]));
    }

    #[test]
    fn segment_boundaries_matter() {
        assert_ne!(fingerprint(["ab", "c"]), fingerprint(["a", "bc"]));
    }
}
