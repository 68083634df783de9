//! Assistant engine: source adapters, DOM reconciliation and effect execution.
mod config;
mod dom;
mod fetch;
mod healing;
mod index;
mod persist;
mod reconcile;
mod runtime;
pub mod sources;
mod trigger;

pub use config::{
    EngineConfig, MixedContentPolicy, BUILTIN_ALLOWLIST, DEFAULT_BAR_ID, DEFAULT_RAW_ELEMENT_ID,
    DEFAULT_WATCH_ROOT_ID,
};
pub use dom::{
    Dom, DomElement, DomError, MutationKind, MutationRecord, NodeHandle, CLASS_HIDDEN,
    CLASS_WHITELISTED,
};
pub use fetch::fetch_entries;
pub use healing::{heal, HealOutcome, RecoveryCache, RecoverySnapshot};
pub use index::IdentityIndex;
pub use persist::{
    ensure_settings_dir, AtomicFileWriter, JsonFileSettingsStore, MemorySettingsStore,
    PersistError, SettingsStore, SETTINGS_FILE_NAME,
};
pub use reconcile::{
    find_wrapper, reconcile, ReconcileReport, CLASS_BODY_DISABLED, CLASS_BODY_ENABLED,
    CLASS_MIXED_VISIBLE, CLASS_SET_CONTAINER, CLASS_WRAPPER_VISIBLE,
};
pub use runtime::Assistant;
pub use sources::{CharacterInfo, HostContext, ProviderError, Providers};
pub use trigger::{
    fire, trigger_entry, trigger_native, trigger_raw_element, trigger_script_runner,
    trigger_task_plugin, TriggerError, TriggerOutcome,
};
