use std::time::Duration;

/// Accumulated durations per pipeline stage.
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    n: Vec<usize>,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    /// Number of samples recorded for stage `i`.
    pub fn n(&self, i: usize) -> usize {
        self.n.get(i).copied().unwrap_or(0)
    }

    pub fn avg_i(&self, i: usize) -> Option<Duration> {
        match (self.duration.get(i), self.n(i)) {
            (Some(d), n) if n > 0 => Some(*d / n as u32),
            _ => None,
        }
    }

    pub fn ts(&self) -> &Vec<Duration> {
        &self.duration
    }

    pub fn add_or_push(&mut self, i: usize, x: Duration) {
        while self.duration.len() <= i {
            self.duration.push(Duration::ZERO);
            self.n.push(0);
        }
        self.duration[i] += x;
        self.n[i] += 1;
    }

    pub fn clear(&mut self) {
        self.n = Default::default();
        self.duration = Default::default();
    }
}
