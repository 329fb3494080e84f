//! Episode metrics for the learning agent

use std::collections::VecDeque;

/// Mean over the most recent `capacity` samples
#[derive(Debug, Clone)]
pub struct MovingAverage {
    recent: VecDeque<f64>,
    capacity: usize,
}

impl MovingAverage {
    pub fn new(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, sample: f64) {
        self.recent.push_back(sample);
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    /// Zero until the first sample arrives
    pub fn average(&self) -> f64 {
        match self.recent.len() {
            0 => 0.0,
            n => self.recent.iter().sum::<f64>() / n as f64,
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.recent.back().copied()
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}

/// Episode outcome tally and recent averages
#[derive(Debug, Clone)]
pub struct EpisodeMetrics {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
    /// Final rewards of recent episodes
    pub rewards: MovingAverage,
    /// Tick counts of recent episodes
    pub lengths: MovingAverage,
    /// Distinct states in the value store after the latest episode
    pub known_states: usize,
}

impl EpisodeMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            episodes: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            rewards: MovingAverage::new(window_size),
            lengths: MovingAverage::new(window_size),
            known_states: 0,
        }
    }

    pub fn record_episode(&mut self, reward: f64, ticks: usize, known_states: usize) {
        self.episodes += 1;
        if reward > 0.0 {
            self.wins += 1;
        } else if reward < 0.0 {
            self.losses += 1;
        } else {
            self.ties += 1;
        }
        self.rewards.push(reward);
        self.lengths.push(ticks as f64);
        self.known_states = known_states;
    }

    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins as f64 / self.episodes as f64
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Episode {} | W/L/T {}/{}/{} ({:.1}% wins) | reward avg {:.2} | length avg {:.0} | {} states",
            self.episodes,
            self.wins,
            self.losses,
            self.ties,
            self.win_rate() * 100.0,
            self.rewards.average(),
            self.lengths.average(),
            self.known_states
        );
    }
}

impl Default for EpisodeMetrics {
    fn default() -> Self {
        Self::new(100)
    }
}
