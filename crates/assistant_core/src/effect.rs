use crate::{Entry, EntrySource};

/// Side effects requested by [`crate::update`]; executed by the engine runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Re-run every source adapter and feed back `Msg::EntriesFetched`.
    FetchEntries,
    /// Run the visibility reconciler against the live DOM.
    Reconcile,
    /// Hand the settings to the host's persistence.
    SaveSettings(crate::Settings),
    /// Fire the provider action behind a popup item.
    Trigger(TriggerRequest),
    /// Debounce expired: restore lost whitelisted containers, then reconcile.
    RunHealingPass,
    /// Re-capture recovery anchors of restored nodes, then reconcile again.
    FollowUpReconcile,
}

/// What to invoke for a clicked entry, one variant per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerRequest {
    Native {
        set_name: String,
        label: String,
    },
    ScriptRunner {
        script_id: String,
        label: String,
        button_id: Option<String>,
    },
    TaskPlugin {
        task_name: String,
    },
    RawElement {
        dom_id: String,
    },
}

impl TriggerRequest {
    pub fn for_entry(entry: &Entry) -> Self {
        match &entry.source {
            EntrySource::NativeReply { .. } => TriggerRequest::Native {
                set_name: entry.set_name.clone(),
                label: entry.label.clone(),
            },
            EntrySource::ScriptRunner {
                script_id,
                button_id,
            } => TriggerRequest::ScriptRunner {
                script_id: script_id.clone(),
                label: entry.label.clone(),
                button_id: button_id.clone(),
            },
            EntrySource::TaskPlugin { task_name, .. } => TriggerRequest::TaskPlugin {
                task_name: task_name.clone(),
            },
            EntrySource::RawElement { dom_id } => TriggerRequest::RawElement {
                dom_id: dom_id.clone(),
            },
        }
    }
}
