use std::sync::Arc;

use parking_lot::Mutex;

use crate::agent::AgentRouting;
use crate::draft::DraftBuffer;
use crate::history::HistoryStore;
use crate::sample::sample_update;
use crate::settings::{load_settings, save_settings, Settings};
use crate::status::OperationStatus;
use crate::store::KeyValueStore;
use crate::types::{Outcome, Screen, Update};

/// Application state owned by the top-level controller.
///
/// Each slot is its own lock and no lock is held across an `.await`, so an
/// in-flight operation never blocks readers.
pub struct AppState {
    pub agents: AgentRouting,
    pub history: HistoryStore,
    pub generation: Mutex<OperationStatus>,
    pub delivery: Mutex<OperationStatus>,
    store: Arc<dyn KeyValueStore>,
    settings: Mutex<Settings>,
    reviewed: Mutex<Option<Update>>,
    draft: Mutex<DraftBuffer>,
    outcome: Mutex<Option<Outcome>>,
    screen: Mutex<Screen>,
    /// Delivery channel being edited; pre-filled from the default channel.
    channel: Mutex<String>,
    show_sample: Mutex<bool>,
}

impl AppState {
    /// Load settings and history from `store` once, at startup.
    pub fn new(store: Arc<dyn KeyValueStore>, agents: AgentRouting) -> Self {
        let settings = load_settings(store.as_ref());
        let history = HistoryStore::load(store.clone());
        log::info!(
            "State ready: project \"{}\", {} stored updates",
            settings.project_name,
            history.len()
        );

        Self {
            agents,
            history,
            generation: Mutex::new(OperationStatus::Idle),
            delivery: Mutex::new(OperationStatus::Idle),
            store,
            channel: Mutex::new(settings.default_channel.clone()),
            settings: Mutex::new(settings),
            reviewed: Mutex::new(None),
            draft: Mutex::new(DraftBuffer::default()),
            outcome: Mutex::new(None),
            screen: Mutex::new(Screen::Dashboard),
            show_sample: Mutex::new(false),
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.lock().clone()
    }

    /// Apply `mutator` to the settings and write them back.
    ///
    /// A changed default channel also replaces the delivery channel.
    pub fn update_settings(&self, mutator: impl FnOnce(&mut Settings)) -> Settings {
        let (updated, channel_changed) = {
            let mut guard = self.settings.lock();
            let previous_channel = guard.default_channel.clone();
            mutator(&mut guard);
            (guard.clone(), guard.default_channel != previous_channel)
        };
        if channel_changed {
            *self.channel.lock() = updated.default_channel.clone();
        }
        save_settings(self.store.as_ref(), &updated);
        updated
    }

    pub fn channel(&self) -> String {
        self.channel.lock().clone()
    }

    pub fn set_channel(&self, channel: &str) {
        *self.channel.lock() = channel.to_string();
    }

    pub fn reviewed_update(&self) -> Option<Update> {
        self.reviewed.lock().clone()
    }

    /// Make `update` the one under review; the draft follows its identity.
    pub fn set_reviewed(&self, update: Update) {
        let reset = self.draft.lock().sync(&update);
        if reset {
            log::debug!("Draft reset for update {}", update.id);
        }
        *self.reviewed.lock() = Some(update);
    }

    pub fn clear_reviewed(&self) {
        *self.reviewed.lock() = None;
        self.draft.lock().clear();
    }

    /// Upsert `update` into history and keep it under review.
    pub fn commit_reviewed(&self, update: Update) -> Arc<Vec<Update>> {
        let snapshot = self.history.upsert(update.clone());
        self.set_reviewed(update);
        snapshot
    }

    pub fn draft(&self) -> DraftBuffer {
        self.draft.lock().clone()
    }

    pub fn with_draft<R>(&self, f: impl FnOnce(&mut DraftBuffer) -> R) -> R {
        f(&mut self.draft.lock())
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome.lock().clone()
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock() = Some(outcome);
    }

    pub fn clear_outcome(&self) {
        *self.outcome.lock() = None;
    }

    /// Dismiss the banner; settled operations return to idle.
    pub fn dismiss_outcome(&self) {
        self.clear_outcome();
        for slot in [&self.generation, &self.delivery] {
            let mut guard = slot.lock();
            if !guard.is_in_flight() {
                *guard = OperationStatus::Idle;
            }
        }
    }

    pub fn generation_status(&self) -> OperationStatus {
        self.generation.lock().clone()
    }

    pub fn delivery_status(&self) -> OperationStatus {
        self.delivery.lock().clone()
    }

    pub fn screen(&self) -> Screen {
        *self.screen.lock()
    }

    /// Switch screens; any banner from the previous screen is dropped.
    pub fn navigate(&self, screen: Screen) {
        *self.screen.lock() = screen;
        self.clear_outcome();
    }

    pub fn show_sample(&self) -> bool {
        *self.show_sample.lock()
    }

    pub fn set_show_sample(&self, on: bool) {
        *self.show_sample.lock() = on;
    }

    /// History as displayed: the sample stands in for an empty history when
    /// sample mode is on.
    pub fn display_updates(&self) -> Arc<Vec<Update>> {
        let snapshot = self.history.snapshot();
        if self.show_sample() && snapshot.is_empty() {
            Arc::new(vec![sample_update()])
        } else {
            snapshot
        }
    }

    /// Update as displayed on the review surface.
    pub fn display_update(&self) -> Option<Update> {
        self.reviewed_update().or_else(|| {
            if self.show_sample() {
                Some(sample_update())
            } else {
                None
            }
        })
    }
}
