use std::sync::Once;
use std::time::{Duration, Instant};

use assistant_core::{
    update, AppState, Column, CustomIcon, Effect, Entry, EntryBuckets, IconType, Msg, Scope,
    SettingChange, Settings, SourceIdentity, TriggerRequest,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(assistant_logging::initialize_for_tests);
}

fn sample_entries() -> EntryBuckets {
    EntryBuckets {
        scripts: vec![Entry::script(
            "abc",
            "Tools",
            "Summarize",
            Some("btn-1".to_string()),
            Scope::Global,
        )],
        standard: vec![Entry::native("Foo", "Hi", "/send hi", Scope::Global)],
    }
}

fn fetched_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::EntriesFetched(sample_entries()));
    state
}

#[test]
fn settings_load_requests_fetch_and_fetch_requests_reconcile() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SettingsLoaded(Settings::default()));
    assert_eq!(effects, vec![Effect::FetchEntries]);

    let (mut state, effects) = update(state, Msg::EntriesFetched(sample_entries()));
    assert_eq!(effects, vec![Effect::Reconcile]);
    assert!(state.consume_dirty());
    assert_eq!(state.entries().len(), 2);
}

#[test]
fn opening_menu_refreshes_entries_and_closing_does_not() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::MenuButtonClicked);
    assert!(state.menu_open());
    assert_eq!(effects, vec![Effect::FetchEntries]);

    let (state, effects) = update(state, Msg::MenuButtonClicked);
    assert!(!state.menu_open());
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::MenuButtonClicked);
    let (state, effects) = update(state, Msg::OutsideClicked);
    assert!(!state.menu_open());
    assert!(effects.is_empty());
}

#[test]
fn clicking_entry_closes_menu_and_triggers() {
    init_logging();
    let (state, _) = update(fetched_state(), Msg::MenuButtonClicked);

    let (state, effects) = update(
        state,
        Msg::EntryClicked {
            column: Column::Scripts,
            index: 0,
        },
    );

    assert!(!state.menu_open());
    assert_eq!(
        effects,
        vec![Effect::Trigger(TriggerRequest::ScriptRunner {
            script_id: "abc".to_string(),
            label: "Summarize".to_string(),
            button_id: Some("btn-1".to_string()),
        })]
    );

    let (_state, effects) = update(
        state,
        Msg::EntryClicked {
            column: Column::Standard,
            index: 7,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn whitelist_toggle_saves_and_reconciles() {
    init_logging();
    let identity = SourceIdentity::script("abc");
    let (state, effects) = update(fetched_state(), Msg::WhitelistToggled(identity.clone()));

    assert!(state.settings().is_whitelisted(&identity));
    assert_eq!(effects.len(), 2);
    assert!(matches!(&effects[0], Effect::SaveSettings(saved) if saved.whitelist == vec![identity.clone()]));
    assert_eq!(effects[1], Effect::Reconcile);

    let view = state.view();
    assert!(view.menu.scripts.items[0].hidden);
    assert_eq!(view.panel.whitelisted.len(), 1);
    assert_eq!(view.panel.available.len(), 1);

    let (state, _) = update(state, Msg::WhitelistToggled(identity.clone()));
    assert!(!state.settings().is_whitelisted(&identity));
}

#[test]
fn disabling_plugin_saves_and_reconciles() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SettingChanged(SettingChange::Enabled(false)),
    );
    assert!(!state.settings().enabled);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[1], Effect::Reconcile);
}

#[test]
fn label_dedup_change_refetches() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SettingChanged(SettingChange::LabelDedup(false)),
    );
    assert!(!state.settings().label_dedup);
    assert_eq!(effects.last(), Some(&Effect::FetchEntries));
}

#[test]
fn cosmetic_settings_only_save() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SettingChanged(SettingChange::CustomIconSaved(CustomIcon {
            name: "cat".to_string(),
            url: "https://example.com/cat.png".to_string(),
        })),
    );
    assert_eq!(state.settings().icon_type, IconType::Custom);
    assert_eq!(effects.len(), 1);

    let (state, _) = update(state, Msg::SettingChanged(SettingChange::CustomIconRemoved(0)));
    assert_eq!(state.settings().icon_type, IconType::Rocket);
    assert!(state.settings().custom_icon_url.is_empty());

    let (state, _) = update(state, Msg::SettingChanged(SettingChange::SetupCompleted));
    let (state, _) = update(state, Msg::SettingChanged(SettingChange::WhitelistHelpDismissed));
    let view = state.view();
    assert!(!view.first_time_setup_pending);
    assert!(!view.show_whitelist_help);
}

#[test]
fn mutation_burst_coalesces_into_one_healing_pass() {
    init_logging();
    let quiet = Duration::from_millis(250);
    let start = Instant::now();
    let state = AppState::with_quiet_period(quiet);

    let (state, _) = update(state, Msg::DomMutated { at: start });
    let (state, _) = update(
        state,
        Msg::DomMutated {
            at: start + Duration::from_millis(100),
        },
    );
    assert!(state.view().heal_pending);

    // Original deadline passed, but the second mutation reset the timer.
    let (state, effects) = update(
        state,
        Msg::Tick {
            now: start + Duration::from_millis(300),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::Tick {
            now: start + Duration::from_millis(350),
        },
    );
    assert_eq!(effects, vec![Effect::RunHealingPass]);

    let (_state, effects) = update(
        state,
        Msg::Tick {
            now: start + Duration::from_millis(900),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn restoration_schedules_one_follow_up_pass() {
    init_logging();
    let now = Instant::now();
    let (state, _) = update(
        AppState::new(),
        Msg::HealingFinished {
            restored: 1,
            entries: EntryBuckets::default(),
        },
    );

    let (state, effects) = update(state, Msg::Tick { now });
    assert_eq!(effects, vec![Effect::FollowUpReconcile]);

    let (state, effects) = update(state, Msg::Tick { now });
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::HealingFinished {
            restored: 0,
            entries: EntryBuckets::default(),
        },
    );
    let (_state, effects) = update(state, Msg::Tick { now });
    assert!(effects.is_empty());
}

#[test]
fn healing_pass_replaces_the_popup_entries() {
    init_logging();
    let refreshed = EntryBuckets {
        scripts: Vec::new(),
        standard: vec![Entry::native("Bar", "Bye", "/send bye", Scope::Global)],
    };

    let (state, effects) = update(
        fetched_state(),
        Msg::HealingFinished {
            restored: 0,
            entries: refreshed.clone(),
        },
    );

    assert_eq!(state.entries(), &refreshed);
    assert!(effects.is_empty());
}

#[test]
fn update_noop_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
