// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Random number helpers for synaptogenesis

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Entropy-seeded generator, or a reproducible one when `seed` is given
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_is_reproducible() {
        let draw = |seed| {
            let mut rng = make_rng(Some(seed));
            (0..4).map(|_| rng.gen::<u64>()).collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));
    }
}
