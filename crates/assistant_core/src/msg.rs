use std::time::Instant;

use crate::{CustomIcon, EntryBuckets, IconType, Settings, SourceIdentity, UiTheme};

/// Popup column an item was clicked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Scripts,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    Enabled(bool),
    LabelDedup(bool),
    IconType(IconType),
    CustomIconUrl(String),
    CustomIconSaved(CustomIcon),
    CustomIconRemoved(usize),
    UiTheme(UiTheme),
    AutoShrink(bool),
    Backdrop(bool),
    SetupCompleted,
    WhitelistHelpDismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Persisted settings became available.
    SettingsLoaded(Settings),
    /// A fresh fetch from all source adapters completed.
    EntriesFetched(EntryBuckets),
    /// User clicked the popup toggle button.
    MenuButtonClicked,
    /// User clicked anywhere outside the popup.
    OutsideClicked,
    /// User clicked an item in the popup.
    EntryClicked { column: Column, index: usize },
    /// User moved a container between the popup and the native bar.
    WhitelistToggled(SourceIdentity),
    /// User edited a setting in the settings panel.
    SettingChanged(SettingChange),
    /// The watched DOM region reported child-list mutations.
    DomMutated { at: Instant },
    /// Frame/timer tick driving debounce expiry and follow-up passes.
    Tick { now: Instant },
    /// A healing pass ran against a fresh fetch; `restored` containers were
    /// re-inserted.
    HealingFinished {
        restored: usize,
        entries: EntryBuckets,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
