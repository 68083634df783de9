use crate::{AppState, Column, Effect, Msg, SettingChange, TriggerRequest};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SettingsLoaded(settings) => {
            state.replace_settings(settings);
            vec![Effect::FetchEntries]
        }
        Msg::EntriesFetched(entries) => {
            state.replace_entries(entries);
            vec![Effect::Reconcile]
        }
        Msg::MenuButtonClicked => {
            let open = !state.menu_open();
            state.set_menu_open(open);
            if open {
                vec![Effect::FetchEntries]
            } else {
                Vec::new()
            }
        }
        Msg::OutsideClicked => {
            state.set_menu_open(false);
            Vec::new()
        }
        Msg::EntryClicked { column, index } => {
            let entries = match column {
                Column::Scripts => &state.entries().scripts,
                Column::Standard => &state.entries().standard,
            };
            let request = entries.get(index).map(TriggerRequest::for_entry);
            match request {
                Some(request) => {
                    state.set_menu_open(false);
                    vec![Effect::Trigger(request)]
                }
                None => Vec::new(),
            }
        }
        Msg::WhitelistToggled(identity) => {
            state.settings_mut().toggle_whitelist(identity);
            vec![
                Effect::SaveSettings(state.settings().clone()),
                Effect::Reconcile,
            ]
        }
        Msg::SettingChanged(change) => apply_setting_change(&mut state, change),
        Msg::DomMutated { at } => {
            state.defer_healing(at);
            Vec::new()
        }
        Msg::Tick { now } => {
            let mut effects = Vec::new();
            if state.take_follow_up() {
                effects.push(Effect::FollowUpReconcile);
            }
            if state.take_due_healing(now) {
                effects.push(Effect::RunHealingPass);
            }
            effects
        }
        Msg::HealingFinished { restored, entries } => {
            state.replace_entries(entries);
            if restored > 0 {
                state.request_follow_up();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_setting_change(state: &mut AppState, change: SettingChange) -> Vec<Effect> {
    let mut follow_up = None;
    let settings = state.settings_mut();
    match change {
        SettingChange::Enabled(enabled) => {
            settings.enabled = enabled;
            follow_up = Some(Effect::Reconcile);
        }
        SettingChange::LabelDedup(dedup) => {
            settings.label_dedup = dedup;
            follow_up = Some(Effect::FetchEntries);
        }
        SettingChange::IconType(icon_type) => settings.icon_type = icon_type,
        SettingChange::CustomIconUrl(url) => settings.custom_icon_url = url,
        SettingChange::CustomIconSaved(icon) => settings.save_custom_icon(icon),
        SettingChange::CustomIconRemoved(index) => {
            settings.remove_custom_icon(index);
        }
        SettingChange::UiTheme(theme) => settings.ui_theme = theme,
        SettingChange::AutoShrink(on) => settings.auto_shrink_enabled = on,
        SettingChange::Backdrop(on) => settings.enable_backdrop = on,
        SettingChange::SetupCompleted => settings.first_time_setup_pending = false,
        SettingChange::WhitelistHelpDismissed => settings.hide_whitelist_help = true,
    }

    let mut effects = vec![Effect::SaveSettings(state.settings().clone())];
    effects.extend(follow_up);
    effects
}
