//! RNG module - deterministic randomness for refills and zap targeting
//!
//! A simple LCG keeps cascades fully reproducible from a seed: the same
//! level, seed, and input sequence always produce the same board history.
//! Refill colors draw uniformly from the four non-white colors; white and
//! special cubes are never randomly spawned.

use crate::types::CubeColor;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Draw a refill color, uniform over the 4 non-white colors.
    pub fn refill_color(&mut self) -> CubeColor {
        let idx = self.next_range(CubeColor::SPAWNABLE.len() as u32) as usize;
        CubeColor::SPAWNABLE[idx]
    }

    /// Pick `count` distinct colors from the spawnable set (for the final
    /// white bonus). `count` is clamped to 4.
    pub fn pick_colors(&mut self, count: usize) -> Vec<CubeColor> {
        let mut pool = CubeColor::SPAWNABLE.to_vec();
        self.shuffle(&mut pool);
        pool.truncate(count.min(pool.len()));
        pool
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_sequence() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_not_degenerate() {
        let mut rng = SimpleRng::new(0);
        let first = rng.next_u32();
        let second = rng.next_u32();
        assert_ne!(first, second);
    }

    #[test]
    fn test_refill_never_white() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert_ne!(rng.refill_color(), CubeColor::White);
        }
    }

    #[test]
    fn test_pick_colors_distinct() {
        let mut rng = SimpleRng::new(11);
        for count in 1..=4 {
            let colors = rng.pick_colors(count);
            assert_eq!(colors.len(), count);
            for (i, c) in colors.iter().enumerate() {
                assert!(!colors[i + 1..].contains(c));
            }
        }
        // Requests beyond the palette are clamped.
        assert_eq!(rng.pick_colors(9).len(), 4);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(3);
        for _ in 0..1000 {
            assert!(rng.next_range(7) < 7);
        }
    }
}
