use std::time::{SystemTime, UNIX_EPOCH};

use pf_core::{IdSource, uuid_v4_from_bytes};
use sha2::{Digest, Sha256};

/// Version 4 UUIDs from a SHA-256 of a seed and a counter.
#[derive(Debug, Clone)]
pub struct DigestIds {
    seed: Vec<u8>,
    counter: u64,
}

impl DigestIds {
    /// Seeded from the clock and process id.
    #[must_use]
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        let mut seed = nanos.to_le_bytes().to_vec();
        seed.extend_from_slice(&std::process::id().to_le_bytes());
        Self { seed, counter: 0 }
    }

    /// Same seed, same sequence.
    #[must_use]
    pub fn seeded(seed: &str) -> Self {
        Self {
            seed: seed.as_bytes().to_vec(),
            counter: 0,
        }
    }
}

impl Default for DigestIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for DigestIds {
    fn next_id(&mut self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.seed);
        hasher.update(self.counter.to_le_bytes());
        self.counter += 1;
        let digest = hasher.finalize();
        let mut bytes = [0_u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        uuid_v4_from_bytes(bytes)
    }
}
