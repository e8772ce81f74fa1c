//! Injectable randomness for critical-hit rolls.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;
use std::collections::VecDeque;

/// Source of unit-interval rolls in `[0, 1)`.
pub trait RollSource {
    fn next_unit(&mut self) -> f32;
}

impl<T: RollSource + ?Sized> RollSource for &mut T {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }
}

/// Deterministic per-user roll stream derived from a tracker seed.
#[derive(Debug, Clone)]
pub struct RollStream {
    rng: SmallRng,
    draws: u64,
}

impl RollStream {
    /// Derive a stream from a seed and a domain tag such as the user id.
    #[must_use]
    pub fn from_user_seed(seed: u64, domain_tag: &[u8]) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(derive_stream_seed(seed, domain_tag)),
            draws: 0,
        }
    }

    /// Number of rolls drawn from this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RollSource for RollStream {
    fn next_unit(&mut self) -> f32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.r#gen::<f32>()
    }
}

/// Adapter for any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngRolls<R>(pub R);

impl<R: RngCore> RollSource for RngRolls<R> {
    fn next_unit(&mut self) -> f32 {
        self.0.r#gen::<f32>()
    }
}

/// Fixed roll sequence for deterministic tests and replays.
///
/// Once the script runs out every roll is just under 1.0, which never crits.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: VecDeque<f32>,
    consumed: usize,
}

impl ScriptedRolls {
    const EXHAUSTED: f32 = 0.999_999;

    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = f32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            consumed: 0,
        }
    }

    /// A script that never produces a critical hit.
    #[must_use]
    pub fn never_crit() -> Self {
        Self::default()
    }

    /// Number of scripted values handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RollSource for ScriptedRolls {
    fn next_unit(&mut self) -> f32 {
        match self.rolls.pop_front() {
            Some(roll) => {
                self.consumed += 1;
                roll.clamp(0.0, Self::EXHAUSTED)
            }
            None => Self::EXHAUSTED,
        }
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
