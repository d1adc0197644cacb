//! Per-request seed derivation.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Seeds are reduced into `[0, SEED_MODULUS)`.
pub const SEED_MODULUS: u64 = 1_000_000;

/// Seed from the image content, or from the wall clock when there is none.
///
/// Identical bytes always give the same seed.
pub fn derive_seed(image: Option<&[u8]>) -> u64 {
    match image {
        Some(bytes) => {
            let digest = Sha256::digest(bytes);
            let mut prefix = [0_u8; 8];
            prefix.copy_from_slice(&digest[..8]);
            u64::from_be_bytes(prefix) % SEED_MODULUS
        }
        None => chrono::Utc::now().timestamp_millis().unsigned_abs() % SEED_MODULUS,
    }
}

/// A generator owned by a single estimation call.
pub fn request_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
