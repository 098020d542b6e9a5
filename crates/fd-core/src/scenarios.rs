//! Built-in synthetic arrival scenarios.
//!
//! Deterministic trace generators for tests, benches, and demonstration
//! runs. Every generator is seeded, so a (scenario, seed) pair always
//! reproduces the same trace.

use fd_common::{ArrivalTrace, Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Perfectly regular heartbeats.
pub fn steady(count: usize, start: f64, interval: f64) -> Result<ArrivalTrace> {
    check_shape(count, interval)?;
    let samples = (0..count).map(|i| start + i as f64 * interval).collect();
    ArrivalTrace::from_samples(samples)
}

/// Heartbeats with uniform jitter of up to `jitter` around the interval.
/// Increments are clamped at zero so the trace stays monotonic.
pub fn jittered(
    count: usize,
    start: f64,
    interval: f64,
    jitter: f64,
    seed: u64,
) -> Result<ArrivalTrace> {
    check_shape(count, interval)?;
    if jitter < 0.0 {
        return Err(Error::Config(format!(
            "scenario jitter must be non-negative, got {jitter}"
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = start;
    let samples = (0..count)
        .map(|i| {
            if i > 0 {
                let dt = interval + rng.random_range(-jitter..=jitter);
                t += dt.max(0.0);
            }
            t
        })
        .collect();
    ArrivalTrace::from_samples(samples)
}

/// Mostly regular heartbeats with a long pause every `burst_every`
/// arrivals, imitating a congested link.
pub fn bursty(
    count: usize,
    start: f64,
    interval: f64,
    burst_every: usize,
    pause: f64,
    seed: u64,
) -> Result<ArrivalTrace> {
    check_shape(count, interval)?;
    if burst_every == 0 {
        return Err(Error::Config("burst_every must be at least 1".into()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = start;
    let samples = (0..count)
        .map(|i| {
            if i > 0 {
                let jitter = rng.random_range(0.0..interval * 0.1);
                t += interval + jitter;
                if i % burst_every == 0 {
                    t += pause;
                }
            }
            t
        })
        .collect();
    ArrivalTrace::from_samples(samples)
}

fn check_shape(count: usize, interval: f64) -> Result<()> {
    if count == 0 {
        return Err(Error::EmptyTrace);
    }
    if !(interval > 0.0) {
        return Err(Error::Config(format!(
            "scenario interval must be positive, got {interval}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_is_exactly_regular() {
        let trace = steady(5, 10.0, 2.5).unwrap();
        assert_eq!(trace.as_slice(), &[10.0, 12.5, 15.0, 17.5, 20.0]);
    }

    #[test]
    fn jittered_is_reproducible_per_seed() {
        let a = jittered(50, 0.0, 10.0, 3.0, 42).unwrap();
        let b = jittered(50, 0.0, 10.0, 3.0, 42).unwrap();
        let c = jittered(50, 0.0, 10.0, 3.0, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bursty_inserts_pauses() {
        let trace = bursty(10, 0.0, 10.0, 4, 100.0, 7).unwrap();
        let samples = trace.as_slice();
        // The gap at each burst index dwarfs the regular interval.
        assert!(samples[4] - samples[3] > 100.0);
        assert!(samples[8] - samples[7] > 100.0);
        assert!(samples[2] - samples[1] < 12.0);
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(matches!(steady(0, 0.0, 1.0), Err(Error::EmptyTrace)));
    }
}
