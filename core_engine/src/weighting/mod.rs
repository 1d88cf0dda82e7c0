mod scoring;
mod token;

pub use scoring::{adjusted_count, decay_factor};
pub use token::Token;

use serde::{Deserialize, Serialize};

use crate::history::{normalize, HistoryStore, WinCountMap};

/// Bias knobs, read each time a list of entrants is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasSettings {
    #[serde(default = "default_use_history")]
    pub use_history: bool,
    #[serde(default = "default_strength")]
    pub strength: f64,
    /// Non-positive means the whole history counts.
    #[serde(default)]
    pub window_days: i64,
}

impl Default for BiasSettings {
    fn default() -> Self {
        Self {
            use_history: default_use_history(),
            strength: default_strength(),
            window_days: 0,
        }
    }
}

fn default_use_history() -> bool {
    true
}

fn default_strength() -> f64 {
    0.5
}

/// Rewrites each token's count using the store's recent wins.
///
/// Output is one token per input token, in input order.
pub fn apply_history_decay_to_tokens<S: AsRef<str>>(
    store: &HistoryStore,
    tokens: &[S],
    strength: f64,
    window_days: i64,
) -> Vec<String> {
    let counts = store.build_win_count_map(window_days);
    decay_tokens(tokens, &counts, strength)
}

/// Same as [`apply_history_decay_to_tokens`] against a precomputed count map.
pub fn decay_tokens<S: AsRef<str>>(tokens: &[S], counts: &WinCountMap, strength: f64) -> Vec<String> {
    let decay = decay_factor(strength);
    tokens
        .iter()
        .map(|raw| {
            let mut token = Token::parse(raw.as_ref());
            let wins = counts.get(&normalize(&token.name)).copied().unwrap_or(0);
            token.count = adjusted_count(token.count, decay, wins);
            token.to_string()
        })
        .collect()
}
