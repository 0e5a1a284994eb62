//! Random Number Generator.

use crate::pbrt::*;

/// 32-bit precision value for 1 - epsilon.
pub const FLOAT_ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1"); // 0.99999994

/// 1 - epsilon in the precision we've selected for `Float`.
pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// Implements the PCG32 pseudo-random number generator.
#[derive(Clone, Debug, PartialEq)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    /// Return a new instance of `RNG` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` by seeding it with the given sequence and offset
    /// within that sequence.
    ///
    /// * `sequence_index` - The sequence to seed with.
    /// * `offset`         - Starting offset into the sequence.
    pub fn new(sequence_index: u64, offset: u64) -> Self {
        let mut ret = Self { state: 0, inc: 0 };
        ret.set_sequence(sequence_index, offset);
        ret
    }

    /// Create a new `RNG` for the given sequence using a scrambled offset.
    ///
    /// * `sequence_index` - The sequence to seed with.
    pub fn from_sequence(sequence_index: u64) -> Self {
        Self::new(sequence_index, mix_bits(sequence_index))
    }

    /// Initialize the random number generator sequence.
    ///
    /// * `sequence_index` - The sequence to seed with.
    /// * `offset`         - Starting offset into the sequence.
    #[inline(always)]
    pub fn set_sequence(&mut self, sequence_index: u64, offset: u64) {
        self.state = 0;
        self.inc = sequence_index.wrapping_shl(1) | 1;
        let _ = self.uniform_u32();

        self.state = self.state.wrapping_add(offset);
        let _ = self.uniform_u32();
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;

        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value over the half open interval [0.0, 1.0).
    pub fn uniform_float(&mut self) -> Float {
        min(
            self.uniform_u32() as Float * hexf32!("0x1.0p-32") as Float,
            ONE_MINUS_EPSILON,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RNG::new(42, 7);
        let mut b = RNG::new(42, 7);
        for _ in 0..16 {
            assert_eq!(a.uniform_u32(), b.uniform_u32());
        }
    }

    #[test]
    fn different_sequences_diverge() {
        let mut a = RNG::new(1, 0);
        let mut b = RNG::new(2, 0);
        let va: Vec<u32> = (0..8).map(|_| a.uniform_u32()).collect();
        let vb: Vec<u32> = (0..8).map(|_| b.uniform_u32()).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn uniform_float_is_in_unit_interval() {
        let mut rng = RNG::from_sequence(1234);
        for _ in 0..1000 {
            let u = rng.uniform_float();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
