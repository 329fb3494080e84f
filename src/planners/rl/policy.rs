//! Tabular Q-learning - sparse value store plus epsilon-greedy selection and one-step updates

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Hyperparameters for the learner
#[derive(Debug, Clone, PartialEq)]
pub struct QLearningConfig {
    /// Step size alpha
    pub learning_rate: f64,
    /// Discount gamma
    pub discount: f64,
    /// Probability of taking the greedy action; the rest is uniform exploration
    pub epsilon: f64,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            discount: 0.9,
            epsilon: 0.9,
            seed: None,
        }
    }
}

/// Sparse map from state key to one estimated return per catalog action.
///
/// Rows are created on demand and zero-initialised; there is no eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    action_count: usize,
    rows: HashMap<String, Vec<f64>>,
}

impl QTable {
    pub fn new(action_count: usize) -> Self {
        Self {
            action_count,
            rows: HashMap::new(),
        }
    }

    /// Rebuild a table from persisted rows; returns the offending key if a row has the wrong width.
    pub fn from_rows(
        action_count: usize,
        rows: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self, String> {
        let mut table = Self::new(action_count);
        for (key, values) in rows {
            if values.len() != action_count {
                return Err(key);
            }
            table.rows.insert(key, values);
        }
        Ok(table)
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, state: &str) -> bool {
        self.rows.contains_key(state)
    }

    /// Values for a state, inserting a zero row on first visit
    pub fn ensure_state(&mut self, state: &str) -> &mut Vec<f64> {
        let action_count = self.action_count;
        self.rows
            .entry(state.to_string())
            .or_insert_with(|| vec![0.0; action_count])
    }

    pub fn values(&self, state: &str) -> Option<&[f64]> {
        self.rows.get(state).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<f64>)> {
        self.rows.iter()
    }
}

/// What follows a transition: another state, or the end of the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState<'a> {
    Terminal,
    State(&'a str),
}

/// One observed step, consumed by `QLearningTable::learn`
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: String,
    pub action: usize,
    pub reward: f64,
    /// None marks a terminal transition
    pub next_state: Option<String>,
}

/// Q-learning engine owning the value store
#[derive(Debug)]
pub struct QLearningTable {
    table: QTable,
    config: QLearningConfig,
    rng: StdRng,
}

impl QLearningTable {
    pub fn new(action_count: usize, config: QLearningConfig) -> Self {
        Self::with_table(QTable::new(action_count), config)
    }

    pub fn with_table(table: QTable, config: QLearningConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { table, config, rng }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Epsilon-greedy choice; ties among maximal values are broken uniformly
    pub fn select_action(&mut self, state: &str) -> usize {
        let action_count = self.table.action_count();
        self.table.ensure_state(state);

        if self.rng.random::<f64>() < self.config.epsilon {
            self.greedy_action(state)
        } else {
            self.rng.random_range(0..action_count)
        }
    }

    fn greedy_action(&mut self, state: &str) -> usize {
        let values = self.table.ensure_state(state).clone();
        let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == best)
            .map(|(i, _)| i)
            .collect();

        match ties.choose(&mut self.rng) {
            Some(&action) => action,
            None => self.rng.random_range(0..values.len()),
        }
    }

    /// One-step Q-learning update
    pub fn update(&mut self, state: &str, action: usize, reward: f64, next: NextState<'_>) {
        let target = match next {
            NextState::Terminal => reward,
            NextState::State(next_state) => {
                let next_values = self.table.ensure_state(next_state);
                let best_next = next_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                reward + self.config.discount * best_next
            }
        };

        let learning_rate = self.config.learning_rate;
        let values = self.table.ensure_state(state);
        if let Some(value) = values.get_mut(action) {
            let predict = *value;
            *value += learning_rate * (target - predict);
            tracing::trace!(state, action, predict, target, updated = *value, "q update");
        } else {
            tracing::warn!(state, action, "q update for out-of-range action ignored");
        }
    }

    pub fn learn(&mut self, transition: Transition) {
        let next = match transition.next_state.as_deref() {
            Some(next_state) => NextState::State(next_state),
            None => NextState::Terminal,
        };
        self.update(&transition.state, transition.action, transition.reward, next);
    }
}
