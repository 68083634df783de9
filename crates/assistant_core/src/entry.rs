use serde::{Deserialize, Serialize};

/// Where an entry's backing button lives, best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Character,
    Preset,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Character => "character",
            Scope::Preset => "preset",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "global" => Some(Scope::Global),
            "character" => Some(Scope::Character),
            "preset" => Some(Scope::Preset),
            _ => None,
        }
    }
}

/// Fieldless discriminant of [`EntrySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    NativeReply,
    ScriptRunner,
    TaskPlugin,
    RawElement,
}

/// Provider-specific correlation data for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    NativeReply {
        message: String,
    },
    ScriptRunner {
        script_id: String,
        /// Present when the button came from the runner's enabled-buttons API.
        button_id: Option<String>,
    },
    TaskPlugin {
        task_name: String,
        task_scope: Scope,
        /// Character tasks are grouped into one synthetic set.
        character_set: bool,
    },
    RawElement {
        dom_id: String,
    },
}

/// One actionable item destined for the popup or the native bar.
///
/// Entries are rebuilt on every fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub set_name: String,
    pub scope: Scope,
    pub source: EntrySource,
}

impl Entry {
    pub fn native(
        set_name: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            label: label.into(),
            set_name: set_name.into(),
            scope,
            source: EntrySource::NativeReply {
                message: message.into(),
            },
        }
    }

    pub fn script(
        script_id: impl Into<String>,
        script_name: impl Into<String>,
        label: impl Into<String>,
        button_id: Option<String>,
        scope: Scope,
    ) -> Self {
        Self {
            label: label.into(),
            set_name: script_name.into(),
            scope,
            source: EntrySource::ScriptRunner {
                script_id: script_id.into(),
                button_id,
            },
        }
    }

    pub fn task(
        task_name: impl Into<String>,
        set_name: impl Into<String>,
        task_scope: Scope,
        character_set: bool,
    ) -> Self {
        let task_name = task_name.into();
        Self {
            label: task_name.clone(),
            set_name: set_name.into(),
            scope: task_scope,
            source: EntrySource::TaskPlugin {
                task_name,
                task_scope,
                character_set,
            },
        }
    }

    pub fn raw_element(dom_id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            set_name: label.clone(),
            label,
            scope: Scope::Global,
            source: EntrySource::RawElement {
                dom_id: dom_id.into(),
            },
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self.source {
            EntrySource::NativeReply { .. } => SourceKind::NativeReply,
            EntrySource::ScriptRunner { .. } => SourceKind::ScriptRunner,
            EntrySource::TaskPlugin { .. } => SourceKind::TaskPlugin,
            EntrySource::RawElement { .. } => SourceKind::RawElement,
        }
    }

    /// Native quick replies are "standard"; everything else is script-like.
    pub fn is_standard(&self) -> bool {
        self.kind() == SourceKind::NativeReply
    }

    pub fn script_id(&self) -> Option<&str> {
        match &self.source {
            EntrySource::ScriptRunner { script_id, .. } => Some(script_id),
            _ => None,
        }
    }
}

/// Output of one fetch: script-like entries and standard quick replies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryBuckets {
    pub scripts: Vec<Entry>,
    pub standard: Vec<Entry>,
}

impl EntryBuckets {
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.standard.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scripts.len() + self.standard.len()
    }

    /// Scripts first, then standard, matching the popup's column order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.scripts.iter().chain(self.standard.iter())
    }

    /// Script ids of every script-runner entry in this fetch.
    pub fn script_ids(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(Entry::script_id)
    }
}
