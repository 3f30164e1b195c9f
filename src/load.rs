// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Synthetic CPU load for exercising horizontal autoscaling.

use sha2::{Digest, Sha256};

/// Iterations used when `/burn` is called without a query.
pub const DEFAULT_BURN_ITERATIONS: u32 = 10_000;

const PAYLOAD: [u8; 1024] = [b'x'; 1024];

/// Run a SHA-256 hash chain `iterations` rounds long.
///
/// Each round hashes the fixed payload followed by the previous digest.
/// Returns the final digest as lowercase hex, or an empty string for zero
/// rounds. Work grows linearly with `iterations`.
pub fn burn(iterations: u32) -> String {
    let mut digest: Vec<u8> = Vec::new();
    for _ in 0..iterations {
        let mut hasher = Sha256::new();
        hasher.update(PAYLOAD);
        hasher.update(&digest);
        digest = hasher.finalize().to_vec();
    }
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iterations_is_empty() {
        assert_eq!(burn(0), "");
    }

    #[test]
    fn known_digests() {
        assert_eq!(
            burn(1),
            "49abd65bbf7f7e40c7055093ed2e3fd75f2f602f2c5fcf955c213e3135eb03f7"
        );
        assert_eq!(
            burn(2),
            "8980813bdabceb8684b3d12bd4cfd1ca3b324240f903ccd9109e0fae91c422e1"
        );
        assert_eq!(
            burn(10),
            "653a0a26ab336527169d2fef4b479115e380c1fe3a86d9b392c4e161d389c167"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(burn(250), burn(250));
        assert_ne!(burn(250), burn(251));
    }
}
