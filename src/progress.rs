use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 50;

/// Day-level progress over a date range
#[derive(Debug)]
pub struct Progress {
    total: usize,
    done: usize,
    started: Instant,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            started: Instant::now(),
        }
    }

    /// Mark one more day as done
    pub fn advance(&mut self) {
        self.done = (self.done + 1).min(self.total);
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.done as f64 / self.total as f64 * 100.0
    }

    /// Status line such as `[#####     ]  10.0% (1/10 days) elapsed 00:00:04 ETA 00:00:36`
    pub fn render(&self) -> String {
        self.render_at(self.started.elapsed())
    }

    fn render_at(&self, elapsed: Duration) -> String {
        let percent = self.percent();
        let filled = ((percent / 2.0) as usize).min(BAR_WIDTH);

        format!(
            "[{:<width$}] {:5.1}% ({}/{} days) elapsed {} ETA {}",
            "#".repeat(filled),
            percent,
            self.done,
            self.total,
            clock(elapsed),
            clock(estimate_remaining(elapsed, self.done, self.total)),
            width = BAR_WIDTH
        )
    }
}

/// Remaining time assuming every day costs the running average
fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    let per_day = elapsed.as_secs_f64() / done as f64;
    Duration::from_secs_f64(per_day * (total - done) as f64)
}

/// HH:MM:SS
fn clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_format() {
        assert_eq!(clock(Duration::ZERO), "00:00:00");
        assert_eq!(clock(Duration::from_secs(59)), "00:00:59");
        assert_eq!(clock(Duration::from_secs(3_725)), "01:02:05");
        assert_eq!(clock(Duration::from_secs(90_000)), "25:00:00");
    }

    #[test]
    fn test_eta_uses_average_per_day() {
        assert_eq!(
            estimate_remaining(Duration::from_secs(20), 2, 10),
            Duration::from_secs(80)
        );
        assert_eq!(estimate_remaining(Duration::from_secs(20), 0, 10), Duration::ZERO);
        assert_eq!(estimate_remaining(Duration::from_secs(20), 10, 10), Duration::ZERO);
    }

    #[test]
    fn test_render_line() {
        let mut progress = Progress::new(4);
        progress.advance();

        let line = progress.render_at(Duration::from_secs(3));

        assert!(line.starts_with(&format!("[{}{}]", "#".repeat(12), " ".repeat(38))));
        assert!(line.contains(" 25.0% (1/4 days)"));
        assert!(line.ends_with("elapsed 00:00:03 ETA 00:00:09"));
    }

    #[test]
    fn test_advance_saturates() {
        let mut progress = Progress::new(1);
        progress.advance();
        progress.advance();
        assert_eq!(progress.done(), 1);
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(Progress::new(0).percent(), 100.0);
    }
}
