//! Deterministic random number generation.
//!
//! Given the same seed, every implementation must produce the same sequence of
//! values so that identical seeds reproduce identical event streams.

/// Stateless RNG keyed by an explicit seed.
pub trait RngOracle {
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32(seed) % sides) + 1
    }
}

/// PCG-XSH-RR generator: 32-bit output from 64-bit state.
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Compute a per-roll seed from the combat seed and roll counters.
///
/// * `combat_seed` - Base seed fixed when the session is created
/// * `nonce` - Monotonic roll counter
/// * `combatant` - Raw id of the combatant the roll belongs to (0 if none)
/// * `context` - Distinguishes independent rolls that share a nonce
pub fn compute_seed(combat_seed: u64, nonce: u64, combatant: u32, context: u32) -> u64 {
    // SplitMix64 and FxHash multipliers
    let mut hash = combat_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(combatant).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
