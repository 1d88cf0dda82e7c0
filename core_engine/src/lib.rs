//! Winner history and history-based entrant weighting for roulette widgets.

pub mod adapter;
pub mod clock;
pub mod history;
pub mod storage;
pub mod weighting;

pub use adapter::{attach, BiasedRoulette, GoalEvent, HistoryHook, Roulette, WinnerQuery};
pub use history::{normalize, HistoryStore, WinEntry, WinHistory};
pub use weighting::{apply_history_decay_to_tokens, BiasSettings, Token};
