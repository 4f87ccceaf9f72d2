//! Delay computation between acquisition attempts.

use std::time::Duration;

use rand::Rng;

/// How a lock retries while its key is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub count: u32,
    /// Base delay between attempts.
    pub delay: Duration,
    /// Maximum random deviation from `delay`.
    pub jitter: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            count: 0,
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Creates a policy.
    pub const fn new(count: u32, delay: Duration, jitter: Duration) -> Self {
        Self {
            count,
            delay,
            jitter,
        }
    }

    /// Total attempts a lock makes before giving up.
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.count) + 1
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&self) -> Duration {
        jittered_delay(self.delay, self.jitter)
    }
}

/// Returns `base` perturbed by up to `jitter` in either direction.
///
/// With zero jitter the base is returned unchanged. When `jitter` exceeds
/// `base` the two are swapped first, so the sampled interval
/// `[base - jitter, base + jitter]` never goes negative.
pub fn jittered_delay(base: Duration, jitter: Duration) -> Duration {
    jittered_delay_with(base, jitter, &mut rand::thread_rng())
}

/// [`jittered_delay`] with an explicit random generator.
pub fn jittered_delay_with<R: Rng + ?Sized>(base: Duration, jitter: Duration, rng: &mut R) -> Duration {
    if jitter.is_zero() {
        return base;
    }
    let (base, jitter) = if jitter > base {
        (jitter, base)
    } else {
        (base, jitter)
    };
    let min = base - jitter;
    let max = base.saturating_add(jitter);
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_zero_jitter_is_deterministic() {
        for ms in [0, 1, 20, 1000] {
            let d = Duration::from_millis(ms);
            assert_eq!(jittered_delay(d, Duration::ZERO), d);
        }
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let base = Duration::from_millis(100);
        let jitter = Duration::from_millis(30);
        for _ in 0..1000 {
            let d = jittered_delay_with(base, jitter, &mut rng);
            assert!(d >= Duration::from_millis(70), "{d:?}");
            assert!(d <= Duration::from_millis(130), "{d:?}");
        }
    }

    #[test]
    fn test_jitter_larger_than_base_is_swapped() {
        let mut rng = StdRng::seed_from_u64(11);
        let base = Duration::from_millis(10);
        let jitter = Duration::from_millis(50);
        for _ in 0..1000 {
            let d = jittered_delay_with(base, jitter, &mut rng);
            assert!(d >= Duration::from_millis(40), "{d:?}");
            assert!(d <= Duration::from_millis(60), "{d:?}");
        }
    }

    #[test]
    fn test_zero_base_with_jitter() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let d = jittered_delay_with(Duration::ZERO, Duration::from_millis(5), &mut rng);
            assert_eq!(d, Duration::from_millis(5));
        }
    }

    #[test]
    fn test_policy_attempts() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
        let policy = RetryPolicy::new(2, Duration::from_millis(20), Duration::ZERO);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.next_delay(), Duration::from_millis(20));
    }
}
