use rand::Rng;
use std::time::Duration;

/// Uniform random duration in `[low, high]`. Returns `low` when the range is empty.
pub fn jittered(low: Duration, high: Duration) -> Duration {
    if high <= low {
        return low;
    }
    let secs = rand::thread_rng().gen_range(low.as_secs_f64()..=high.as_secs_f64());
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_bounds() {
        let low = Duration::from_millis(1500);
        let high = Duration::from_millis(3500);
        for _ in 0..200 {
            let d = jittered(low, high);
            assert!(d >= low && d <= high, "{:?} out of range", d);
        }
    }

    #[test]
    fn degenerate_range() {
        assert_eq!(jittered(Duration::ZERO, Duration::ZERO), Duration::ZERO);
        let one = Duration::from_secs(1);
        assert_eq!(jittered(one, Duration::ZERO), one);
    }
}
