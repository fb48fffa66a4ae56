//! Random number oracle.
//!
//! The host owns the randomness source; the encounter only ever asks for a
//! uniform integer in an inclusive range. [`PcgRng`] is a small seeded
//! generator used by the sandbox host and tests.

/// Uniform integer draws provided by the host.
pub trait RngOracle {
    /// Generate the next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Generate a uniform value in range [min, max] inclusive.
    ///
    /// Uses rejection sampling so every value in the range is equally likely.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = max - min;
        if span == u32::MAX {
            return self.next_u32();
        }
        let range = span + 1;
        // Largest multiple of `range` that fits in u32; draws above it are biased.
        let zone = u32::MAX - (u32::MAX % range) - 1;
        loop {
            let value = self.next_u32();
            if value <= zone {
                return min + value % range;
            }
        }
    }

    /// Pick a uniformly random index into a collection of `len` elements.
    fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = u32::try_from(len - 1).unwrap_or(u32::MAX);
        Some(self.range(0, last) as usize)
    }
}

/// Unbiased in-place Fisher–Yates shuffle driven by the oracle.
pub fn shuffle<T, R>(rng: &mut R, items: &mut [T])
where
    R: RngOracle + ?Sized,
{
    for i in (1..items.len()).rev() {
        let last = u32::try_from(i).unwrap_or(u32::MAX);
        let j = rng.range(0, last) as usize;
        items.swap(i, j);
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// This implementation uses PCG-XSH-RR, which produces 32-bit output from
/// 64-bit state. Same seed, same sequence.
#[derive(Clone, Copy, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.state = Self::pcg_step(rng.state.wrapping_add(seed));
        rng
    }

    /// Advance the PCG state by one step.
    ///
    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl Default for PcgRng {
    fn default() -> Self {
        Self::new(0x853c_49e6_748f_ea9b)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        Self::pcg_output(old)
    }
}
