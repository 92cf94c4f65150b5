//! Content fingerprints for generated quizzes.

use sha2::{Digest, Sha256};

/// SHA-256 of the article text a quiz was generated from.
///
/// Whitespace runs are folded before hashing so the same article extracted
/// through different strategies (feed vs. readability) hashes identically
/// as long as the words match.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            hasher.update(b" ");
        }
        hasher.update(word.as_bytes());
    }
    hex::encode(hasher.finalize())
}
