//! Assistant core: entry model, merge rules and the pure controller state machine.
mod aggregate;
mod effect;
mod entry;
mod identity;
mod menu;
mod msg;
mod panel;
mod settings;
mod state;
mod update;
mod view_model;

pub use aggregate::{
    aggregate, LabelFilter, NativeItemRecord, NativeLevel, NativeSetRecord, RawElementRecord,
    ScriptButtonRecord, SourceRecords, TaskRecord,
};
pub use effect::{Effect, TriggerRequest};
pub use entry::{Entry, EntryBuckets, EntrySource, Scope, SourceKind};
pub use identity::{
    resolve_identity, SourceIdentity, SourceTag, CHARACTER_TASK_SET, SCRIPT_CONTAINER_PREFIX,
};
pub use menu::{build_menu, filter_menu_items, GroupPosition, MenuColumn, MenuItem, MenuView};
pub use msg::{Column, Msg, SettingChange};
pub use panel::{whitelist_panel, WhitelistCandidate, WhitelistPanel, TASK_DISPLAY_PREFIX};
pub use settings::{CustomIcon, IconType, Settings, UiTheme};
pub use state::{AppState, DEFAULT_QUIET_PERIOD};
pub use update::update;
pub use view_model::AppViewModel;
