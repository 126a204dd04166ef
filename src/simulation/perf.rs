use instant::Instant;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug)]
pub struct PerformanceTracker {
    samples: VecDeque<Duration>,
    max_samples: usize,
    current_step_start: Option<Instant>,
    total_steps: u64,
}

impl PerformanceTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            current_step_start: None,
            total_steps: 0,
        }
    }

    pub fn start_step(&mut self) {
        self.current_step_start = Some(Instant::now());
    }

    pub fn end_step(&mut self) {
        if let Some(start) = self.current_step_start.take() {
            self.record(start.elapsed());
        }
    }

    pub fn record(&mut self, duration: Duration) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
        self.total_steps += 1;
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn average_step_time(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    pub fn max_step_time(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }
}
