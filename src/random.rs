//! Deterministic random stream
//!
//! A Park–Miller multiplicative linear congruential generator. One instance
//! drives a whole generation run; every random decision in the pipeline draws
//! from it in a fixed order, so the same seed always yields the same city.

/// Multiplier of the generator
const MULTIPLIER: u64 = 48_271;

/// Modulus of the generator (a Mersenne prime, 2^31 - 1)
pub const MODULUS: u64 = 2_147_483_647;

/// Largest valid seed
pub const MAX_SEED: u32 = (MODULUS - 1) as u32;

/// Seeded random stream for a single generation run
///
/// Not `Clone`: a run has exactly one stream.
#[derive(Debug)]
pub struct Random {
    state: u64,
}

impl Random {
    /// Create a stream from a seed in `1..=MAX_SEED`
    ///
    /// Seeds outside that range are folded back into it; zero maps to one,
    /// since the generator would otherwise be stuck at zero.
    pub fn new(seed: u32) -> Self {
        let state = u64::from(seed) % MODULUS;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Current internal state (the last value returned by `next`)
    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance the generator and return the raw value in `1..MODULUS`
    #[inline]
    pub fn next(&mut self) -> u64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        self.state
    }

    /// Uniform float in `[0, 1)`
    #[inline]
    pub fn float(&mut self) -> f64 {
        self.next() as f64 / MODULUS as f64
    }

    /// Average of three floats: a cheap bell-shaped value in `[0, 1)`
    pub fn normal(&mut self) -> f64 {
        (self.float() + self.float() + self.float()) / 3.0
    }

    /// `floor(min + float * (max - min))`
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        (min as f64 + self.float() * (max - min) as f64).floor() as i64
    }

    /// Random index in `0..len`; `len` must be positive
    pub fn index(&mut self, len: usize) -> usize {
        let i = self.int(0, len as i64).max(0) as usize;
        i.min(len.saturating_sub(1))
    }

    /// `true` with probability `chance`
    #[inline]
    pub fn bool(&mut self, chance: f64) -> bool {
        self.float() < chance
    }

    /// Value centered on 0.5 whose spread around the center is `spread`
    pub fn fuzzy(&mut self, spread: f64) -> f64 {
        if spread == 0.0 {
            0.5
        } else {
            (1.0 - spread) / 2.0 + spread * self.normal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_sequence_seed_42() {
        let mut rng = Random::new(42);
        let raw: Vec<u64> = (0..5).map(|_| rng.next()).collect();
        assert_eq!(raw, vec![2_027_382, 1_226_992_407, 551_494_037, 961_371_815, 1_404_753_842]);

        let mut rng = Random::new(42);
        let expected = [
            0.0009440733124241574,
            0.5713628640265032,
            0.2568094233315482,
            0.44767363716274206,
            0.65413948272082,
        ];
        for e in expected {
            let f = rng.float();
            assert!((f - e).abs() < 1e-15, "expected {e}, got {f}");
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Random::new(1234);
        let mut b = Random::new(1234);
        for _ in 0..100 {
            assert_eq!(a.int(-5, 17), b.int(-5, 17));
            assert_eq!(a.bool(0.3), b.bool(0.3));
        }
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = Random::new(0);
        assert_ne!(rng.next(), 0);
        assert_eq!(Random::new(0).next(), Random::new(1).next());
    }

    #[test]
    fn test_ranges() {
        let mut rng = Random::new(7);
        for _ in 0..1000 {
            let f = rng.float();
            assert!((0.0..1.0).contains(&f));
            let i = rng.int(3, 9);
            assert!((3..9).contains(&i));
            let n = rng.normal();
            assert!((0.0..1.0).contains(&n));
            assert!(rng.index(4) < 4);
        }
    }

    #[test]
    fn test_fuzzy() {
        let mut rng = Random::new(99);
        assert_eq!(rng.fuzzy(0.0), 0.5);
        for _ in 0..100 {
            let v = rng.fuzzy(0.4);
            assert!(v >= 0.3 && v < 0.7);
        }
    }

    #[test]
    fn test_bool_extremes() {
        let mut rng = Random::new(5);
        for _ in 0..50 {
            assert!(!rng.bool(0.0));
            assert!(rng.bool(1.0));
        }
    }
}
