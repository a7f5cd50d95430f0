// Engine Configuration
// Tunables for primality testing, prime search and random sampling

/// Rounds of Miller-Rabin per candidate. False positive rate is at most 4^-rounds.
pub const DEFAULT_MILLER_RABIN_ROUNDS: u32 = 10;

/// Smallest prime the console front-end accepts or generates.
pub const DEFAULT_MIN_PRIME_BITS: u64 = 1024;

/// How `uniform_in_range` maps random bytes onto a range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Sampling {
    /// Draw `bits(range)` bits and redraw anything outside the range. Unbiased.
    #[default]
    Rejection,
    /// Draw one spare byte and reduce modulo the range. Slightly biased when the
    /// range is not a power of two, but reproduces the reference sampler.
    ModuloReduction,
}

/// Configuration for key generation and primality testing
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub miller_rabin_rounds: u32,
    pub max_prime_attempts: usize,
    pub max_coprime_attempts: usize,
    pub sampling: Sampling,
    pub min_prime_bits: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            miller_rabin_rounds: DEFAULT_MILLER_RABIN_ROUNDS,
            max_prime_attempts: 100_000,
            max_coprime_attempts: 10_000,
            sampling: Sampling::default(),
            min_prime_bits: DEFAULT_MIN_PRIME_BITS,
        }
    }
}

impl EngineConfig {
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.miller_rabin_rounds = rounds;
        self
    }

    pub fn with_max_prime_attempts(mut self, attempts: usize) -> Self {
        self.max_prime_attempts = attempts;
        self
    }

    pub fn with_max_coprime_attempts(mut self, attempts: usize) -> Self {
        self.max_coprime_attempts = attempts;
        self
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_min_prime_bits(mut self, bits: u64) -> Self {
        self.min_prime_bits = bits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.miller_rabin_rounds, 10);
        assert_eq!(config.min_prime_bits, 1024);
        assert_eq!(config.sampling, Sampling::Rejection);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_rounds(20)
            .with_max_prime_attempts(5)
            .with_max_coprime_attempts(7)
            .with_sampling(Sampling::ModuloReduction)
            .with_min_prime_bits(16);

        assert_eq!(config.miller_rabin_rounds, 20);
        assert_eq!(config.max_prime_attempts, 5);
        assert_eq!(config.max_coprime_attempts, 7);
        assert_eq!(config.sampling, Sampling::ModuloReduction);
        assert_eq!(config.min_prime_bits, 16);
    }
}
