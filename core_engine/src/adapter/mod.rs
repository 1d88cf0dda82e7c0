mod reset;
mod winner;

pub use reset::{bind_once, ResetControl, ResetHandler};
pub use winner::{GoalEvent, WinnerQuery, WinnerSources};

use std::sync::{Arc, RwLock};

use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::history::HistoryStore;
use crate::weighting::{apply_history_decay_to_tokens, BiasSettings};

pub const DEFAULT_RESET_CONFIRMATION: &str = "History has been reset.";

/// Where bias settings come from at the moment entrants are submitted.
pub trait SettingsProvider: Send + Sync {
    fn bias_settings(&self) -> BiasSettings;
}

impl SettingsProvider for BiasSettings {
    fn bias_settings(&self) -> BiasSettings {
        self.clone()
    }
}

impl SettingsProvider for RwLock<BiasSettings> {
    fn bias_settings(&self) -> BiasSettings {
        match self.read() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// The surface of an external roulette widget.
pub trait Roulette: WinnerQuery {
    fn is_ready(&self) -> bool;
    fn set_marbles(&mut self, tokens: Vec<String>);

    fn reset_control(&mut self) -> Option<&mut dyn ResetControl> {
        None
    }
}

/// History-aware glue shared by every widget binding.
pub struct HistoryHook {
    store: Arc<HistoryStore>,
    settings: Arc<dyn SettingsProvider>,
    sources: WinnerSources,
    reset_confirmation: String,
}

impl HistoryHook {
    pub fn new(store: Arc<HistoryStore>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            store,
            settings,
            sources: WinnerSources::default(),
            reset_confirmation: DEFAULT_RESET_CONFIRMATION.to_string(),
        }
    }

    pub fn with_sources(mut self, sources: WinnerSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_reset_confirmation(mut self, message: impl Into<String>) -> Self {
        self.reset_confirmation = message.into();
        self
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    pub fn settings(&self) -> BiasSettings {
        self.settings.bias_settings()
    }

    pub fn adjust_entrants(&self, tokens: Vec<String>) -> Vec<String> {
        let settings = self.settings();
        self.adjust_entrants_with(tokens, &settings)
    }

    pub fn adjust_entrants_with(&self, tokens: Vec<String>, settings: &BiasSettings) -> Vec<String> {
        if !settings.use_history {
            return tokens;
        }
        apply_history_decay_to_tokens(
            &self.store,
            tokens.as_slice(),
            settings.strength,
            settings.window_days,
        )
    }

    /// Records the winner of a goal event, if one can be found.
    pub fn record_goal(&self, event: &GoalEvent, query: &dyn WinnerQuery) -> Option<String> {
        let Some(winner) = self.sources.extract(event, query) else {
            debug!("goal event carried no winner name");
            return None;
        };
        self.store.add_win(&winner);
        Some(winner)
    }

    pub fn reset(&self) -> String {
        self.store.reset_history();
        info!("win history reset");
        self.reset_confirmation.clone()
    }

    fn reset_handler(self: &Arc<Self>) -> ResetHandler {
        let hook = Arc::clone(self);
        Box::new(move || hook.reset())
    }
}

/// A widget whose entrants pass through the history hook.
///
/// Not itself a [`Roulette`], so an attached widget cannot be attached again:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use roulette_core::adapter::{attach, BiasedRoulette, HistoryHook, Roulette};
///
/// async fn attach_twice<R: Roulette>(wheel: BiasedRoulette<R>, hook: Arc<HistoryHook>) {
///     attach(wheel, hook, Duration::from_millis(100)).await;
/// }
/// ```
pub struct BiasedRoulette<R> {
    inner: R,
    hook: Arc<HistoryHook>,
}

impl<R: Roulette> BiasedRoulette<R> {
    pub fn set_marbles(&mut self, tokens: Vec<String>) {
        let tokens = self.hook.adjust_entrants(tokens);
        self.inner.set_marbles(tokens);
    }

    pub fn on_goal(&self, event: &GoalEvent) -> Option<String> {
        self.hook.record_goal(event, &self.inner)
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Waits for `widget` to report ready, wires its reset control if it has
/// one, and wraps it.
pub async fn attach<R: Roulette>(
    mut widget: R,
    hook: Arc<HistoryHook>,
    poll_interval: Duration,
) -> BiasedRoulette<R> {
    while !widget.is_ready() {
        sleep(poll_interval).await;
    }

    if let Some(control) = widget.reset_control() {
        if bind_once(control, hook.reset_handler()) {
            debug!("reset control bound");
        }
    }

    BiasedRoulette { inner: widget, hook }
}
