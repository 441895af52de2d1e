use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;

/// Linear backoff with up to 50% random jitter added.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let base = base_ms.saturating_mul(attempt.max(1) as u64);
    let jitter = if base == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=base / 2)
    };

    Duration::from_millis(base + jitter)
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_stays_within_jitter_bounds() {
        for attempt in 1..=4 {
            let delay = backoff_delay(attempt, 200).as_millis() as u64;
            let base = 200 * attempt as u64;
            assert!(delay >= base && delay <= base + base / 2);
        }
    }

    #[test]
    fn zero_base_means_no_delay() {
        assert_eq!(backoff_delay(3, 0), Duration::ZERO);
    }
}
