//! Uniform die rolls and degree-of-success arithmetic.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A single die, identified by its number of sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Die(pub u32);

pub const D4: Die = Die(4);
pub const D6: Die = Die(6);
pub const D8: Die = Die(8);
pub const D10: Die = Die(10);
pub const D12: Die = Die(12);
pub const D20: Die = Die(20);
pub const D100: Die = Die(100);

impl Die {
    /// Rolls the die using the given source, returning a value in `[1, sides]`.
    pub fn roll(self, dice: &mut Dice) -> i32 {
        dice.rng.gen_range(1..=self.0) as i32
    }
}

/// Degree of success for a d20-based check against a difficulty class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DegreeOfSuccess {
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl DegreeOfSuccess {
    fn step_up(self) -> Self {
        use DegreeOfSuccess::*;
        match self {
            CriticalFailure => Failure,
            Failure => Success,
            Success => CriticalSuccess,
            CriticalSuccess => CriticalSuccess,
        }
    }

    fn step_down(self) -> Self {
        use DegreeOfSuccess::*;
        match self {
            CriticalFailure => CriticalFailure,
            Failure => CriticalFailure,
            Success => Failure,
            CriticalSuccess => Success,
        }
    }
}

/// Computes the degree of success for `roll` (the raw d20 face) against
/// `total` (roll + modifiers) vs. `dc`, then applies the nat-20/nat-1 step.
pub fn degree_of_success(roll: i32, total: i32, dc: i32) -> DegreeOfSuccess {
    use DegreeOfSuccess::*;

    let mut dos = if total >= dc + 10 {
        CriticalSuccess
    } else if total >= dc {
        Success
    } else if total <= dc - 10 {
        CriticalFailure
    } else {
        Failure
    };

    if roll == 20 && dos != CriticalSuccess {
        dos = dos.step_up();
    } else if roll == 1 && dos != CriticalFailure {
        dos = dos.step_down();
    }

    dos
}

/// Owns the RNG state for one simulation. Never shared across simulations —
/// each `Simulation` gets its own isolated `Dice`.
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Rolls a d20, returning the raw face value.
    pub fn d20(&mut self) -> i32 {
        D20.roll(self)
    }

    /// Rolls `count` dice of `sides` and sums them.
    pub fn roll_sum(&mut self, count: u32, sides: u32) -> i32 {
        let die = Die(sides);
        (0..count).map(|_| die.roll(self)).sum()
    }

    /// Picks up to `k` indices from `0..len` uniformly at random, without
    /// replacement. Returns all indices if `len <= k`.
    pub fn choose_indices(&mut self, len: usize, k: usize) -> Vec<usize> {
        if len <= k {
            return (0..len).collect();
        }
        let mut pool: Vec<usize> = (0..len).collect();
        let mut chosen = Vec::with_capacity(k);
        for _ in 0..k {
            let i = self.rng.gen_range(0..pool.len());
            chosen.push(pool.swap_remove(i));
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_in_total_minus_dc_for_fixed_roll() {
        let dc = 15;
        let mut prev = DegreeOfSuccess::CriticalFailure;
        for total in -10..40 {
            let dos = degree_of_success(10, total, dc);
            assert!(dos >= prev, "total={total} regressed");
            prev = dos;
        }
    }

    #[test]
    fn nat20_steps_up_even_on_critical_failure() {
        let dos = degree_of_success(20, 1, 100);
        assert_eq!(dos, DegreeOfSuccess::Failure);
    }

    #[test]
    fn nat1_steps_down_even_on_critical_success() {
        let dos = degree_of_success(1, 200, 10);
        assert_eq!(dos, DegreeOfSuccess::Success);
    }

    #[test]
    fn nat20_cannot_exceed_critical_success() {
        let dos = degree_of_success(20, 100, 10);
        assert_eq!(dos, DegreeOfSuccess::CriticalSuccess);
    }

    #[test]
    fn exact_boundaries() {
        assert_eq!(degree_of_success(10, 20, 10), DegreeOfSuccess::CriticalSuccess);
        assert_eq!(degree_of_success(10, 10, 10), DegreeOfSuccess::Success);
        assert_eq!(degree_of_success(10, 0, 10), DegreeOfSuccess::CriticalFailure);
        assert_eq!(degree_of_success(10, 5, 10), DegreeOfSuccess::Failure);
    }

    #[test]
    fn choose_indices_respects_len() {
        let mut dice = Dice::from_seed(1);
        assert_eq!(dice.choose_indices(2, 5).len(), 2);
        assert_eq!(dice.choose_indices(5, 2).len(), 2);
    }
}
