use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use assistant_core::{
    update, AppState, AppViewModel, Effect, EntryBuckets, LabelFilter, Msg, Settings,
};
use assistant_logging::{qra_debug, qra_error, qra_info, qra_warn, LogCategory};

use crate::healing::{heal, HealOutcome, RecoveryCache};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::sources::{native_set_containers, read_script_buttons};
use crate::{fetch_entries, fire, Dom, EngineConfig, NodeHandle, Providers, SettingsStore};

/// Runs the controller against one page.
///
/// Messages go through [`assistant_core::update`]; the effects it returns are
/// executed here against the DOM and the providers, and any follow-up message
/// is fed back until the queue is empty.
pub struct Assistant {
    config: EngineConfig,
    providers: Providers,
    store: Arc<dyn SettingsStore>,
    state: AppState,
    recovery: RecoveryCache,
    last_report: ReconcileReport,
    last_heal: HealOutcome,
}

impl Assistant {
    pub fn new(config: EngineConfig, providers: Providers, store: Arc<dyn SettingsStore>) -> Self {
        let state = AppState::with_quiet_period(config.quiet_period);
        Self {
            config,
            providers,
            store,
            state,
            recovery: RecoveryCache::default(),
            last_report: ReconcileReport::default(),
            last_heal: HealOutcome::default(),
        }
    }

    /// Loads settings and runs the first fetch and reconcile. The initial
    /// render counts as a mutation burst, so the first healing pass captures
    /// recovery snapshots once `now` plus the quiet period has passed.
    pub async fn start(&mut self, dom: &mut Dom, now: Instant) {
        let settings = self.store.load().unwrap_or_else(|err| {
            qra_warn!(LogCategory::System; "cannot load settings, using defaults: {err}");
            Settings::default()
        });
        qra_info!(
            LogCategory::System;
            "assistant starting: enabled={}, {} whitelisted",
            settings.enabled,
            settings.whitelist.len()
        );
        self.dispatch(dom, Msg::SettingsLoaded(settings)).await;
        self.dispatch(dom, Msg::DomMutated { at: now }).await;
    }

    pub async fn dispatch(&mut self, dom: &mut Dom, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            if is_user_action(&msg) {
                qra_debug!(LogCategory::Ui; "user action {msg:?}");
            } else {
                qra_debug!(LogCategory::Core; "dispatch {msg:?}");
            }
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            for effect in effects {
                if let Some(next) = self.run_effect(dom, effect).await {
                    queue.push_back(next);
                }
            }
        }
    }

    /// Drains the DOM journal. Child-list changes under the watch root open or
    /// extend the quiet period; returns whether any were seen.
    pub async fn observe(&mut self, dom: &mut Dom, now: Instant) -> bool {
        let records = dom.take_mutations();
        let root = dom
            .get_element_by_id(&self.config.watch_root_id)
            .unwrap_or_else(|| dom.document());
        let relevant = records.iter().any(|record| dom.contains(root, record.parent));
        if relevant {
            self.dispatch(dom, Msg::DomMutated { at: now }).await;
        }
        relevant
    }

    pub async fn tick(&mut self, dom: &mut Dom, now: Instant) {
        self.dispatch(dom, Msg::Tick { now }).await;
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn recovery(&self) -> &RecoveryCache {
        &self.recovery
    }

    pub fn last_report(&self) -> &ReconcileReport {
        &self.last_report
    }

    pub fn last_heal(&self) -> &HealOutcome {
        &self.last_heal
    }

    /// Outline of the action bar with visibility markers.
    pub fn structure_dump(&self, dom: &Dom) -> String {
        match dom.get_element_by_id(&self.config.bar_id) {
            Some(bar) => dom.structure(bar),
            None => format!("#{} not found", self.config.bar_id),
        }
    }

    async fn run_effect(&mut self, dom: &mut Dom, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::FetchEntries => Some(Msg::EntriesFetched(self.fetch(dom))),
            Effect::Reconcile => {
                self.reconcile(dom);
                None
            }
            Effect::SaveSettings(settings) => {
                if let Err(err) = self.store.save(&settings) {
                    qra_error!(LogCategory::System; "failed to save settings: {err}");
                }
                None
            }
            Effect::Trigger(request) => {
                fire(&self.providers, dom, &request).await;
                None
            }
            Effect::RunHealingPass => {
                let entries = self.fetch(dom);
                let valid = self.valid_script_ids();
                let settings = self.state.settings();
                let outcome = heal(
                    dom,
                    &mut self.recovery,
                    &self.config,
                    &settings.whitelist,
                    &valid,
                    settings.enabled,
                );
                self.reconcile(dom);
                let restored = outcome.restored_count();
                self.last_heal = outcome;
                Some(Msg::HealingFinished { restored, entries })
            }
            Effect::FollowUpReconcile => {
                self.recovery.refresh_anchors(dom);
                self.reconcile(dom);
                None
            }
        }
    }

    fn fetch(&self, dom: &Dom) -> EntryBuckets {
        let filter = LabelFilter::from_flag(self.state.settings().label_dedup);
        fetch_entries(&self.providers, dom, &self.config, filter)
    }

    fn reconcile(&mut self, dom: &mut Dom) {
        let native_sets = self.native_containers();
        let settings = self.state.settings();
        self.last_report = reconcile(
            dom,
            &self.config,
            &native_sets,
            &settings.whitelist,
            settings.enabled,
        );
    }

    fn native_containers(&self) -> Vec<(String, NodeHandle)> {
        let Some(provider) = self.providers.native.as_deref() else {
            return Vec::new();
        };
        match provider.settings() {
            Ok(settings) => native_set_containers(&settings),
            Err(err) => {
                qra_debug!(LogCategory::Whitelist; "native containers unavailable: {err}");
                Vec::new()
            }
        }
    }

    /// Scripts the runner currently reports; anything else is not restored.
    fn valid_script_ids(&self) -> HashSet<String> {
        let Some(provider) = self.providers.script_runner.as_deref() else {
            return HashSet::new();
        };
        let character = self.providers.current_character();
        match read_script_buttons(provider, character.as_ref()) {
            Ok(buttons) => buttons.into_iter().map(|b| b.script_id).collect(),
            Err(err) => {
                qra_warn!(LogCategory::Update; "cannot list scripts for healing: {err}");
                HashSet::new()
            }
        }
    }
}

fn is_user_action(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::MenuButtonClicked
            | Msg::OutsideClicked
            | Msg::EntryClicked { .. }
            | Msg::WhitelistToggled(_)
            | Msg::SettingChanged(_)
    )
}
