use std::collections::HashSet;

use crate::{Entry, EntryBuckets, Scope};

/// Native quick-reply configuration levels, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeLevel {
    Chat,
    Character,
    Global,
}

impl NativeLevel {
    pub const PRIORITY: [NativeLevel; 3] =
        [NativeLevel::Chat, NativeLevel::Character, NativeLevel::Global];

    fn scope(&self) -> Scope {
        match self {
            NativeLevel::Chat | NativeLevel::Character => Scope::Character,
            NativeLevel::Global => Scope::Global,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeItemRecord {
    pub label: String,
    pub message: String,
}

/// A visible native set with its visible items, as read by the native adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSetRecord {
    pub level: NativeLevel,
    pub name: String,
    pub items: Vec<NativeItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptButtonRecord {
    pub script_id: String,
    pub script_name: String,
    pub label: String,
    pub button_id: Option<String>,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub scope: Scope,
    /// Set for character tasks; they are grouped under this name.
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElementRecord {
    pub dom_id: String,
    pub label: String,
}

/// Everything the source adapters produced for one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRecords {
    pub native: Vec<NativeSetRecord>,
    pub scripts: Vec<ScriptButtonRecord>,
    pub tasks: Vec<TaskRecord>,
    pub raw: Option<RawElementRecord>,
}

/// Label de-duplication mode across the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelFilter {
    /// First-seen label wins; later sources skip it.
    #[default]
    Dedup,
    /// Every label is surfaced.
    NoFilter,
}

impl LabelFilter {
    pub fn from_flag(dedup: bool) -> Self {
        if dedup {
            LabelFilter::Dedup
        } else {
            LabelFilter::NoFilter
        }
    }
}

struct SeenLabels {
    filter: LabelFilter,
    seen: HashSet<String>,
}

impl SeenLabels {
    fn new(filter: LabelFilter) -> Self {
        Self {
            filter,
            seen: HashSet::new(),
        }
    }

    /// Records `label`; returns false when it should be skipped.
    fn admit(&mut self, label: &str) -> bool {
        match self.filter {
            LabelFilter::NoFilter => true,
            LabelFilter::Dedup => self.seen.insert(label.to_string()),
        }
    }
}

fn clean_label(raw: &str) -> Option<&str> {
    let label = raw.trim();
    (!label.is_empty()).then_some(label)
}

/// Merges adapter output into the two popup buckets.
///
/// Order: native sets (chat, character, global), script buttons, tasks, raw
/// element. A native set name consumed at one level is skipped at every lower
/// level.
pub fn aggregate(records: &SourceRecords, filter: LabelFilter) -> EntryBuckets {
    let mut buckets = EntryBuckets::default();
    let mut labels = SeenLabels::new(filter);

    let mut consumed_sets: HashSet<&str> = HashSet::new();
    for level in NativeLevel::PRIORITY {
        let mut consumed_here = Vec::new();
        for set in records.native.iter().filter(|set| set.level == level) {
            if consumed_sets.contains(set.name.as_str()) {
                continue;
            }
            consumed_here.push(set.name.as_str());
            for item in &set.items {
                let Some(label) = clean_label(&item.label) else {
                    continue;
                };
                if labels.admit(label) {
                    buckets
                        .standard
                        .push(Entry::native(&set.name, label, &item.message, level.scope()));
                }
            }
        }
        consumed_sets.extend(consumed_here);
    }

    for button in &records.scripts {
        let Some(label) = clean_label(&button.label) else {
            continue;
        };
        if labels.admit(label) {
            buckets.scripts.push(Entry::script(
                &button.script_id,
                &button.script_name,
                label,
                button.button_id.clone(),
                button.scope,
            ));
        }
    }

    for task in &records.tasks {
        let Some(name) = clean_label(&task.name) else {
            continue;
        };
        if !labels.admit(name) {
            continue;
        }
        let entry = match &task.character_name {
            Some(character) => Entry::task(name, character, Scope::Character, true),
            None => Entry::task(name, name, task.scope, false),
        };
        buckets.scripts.push(entry);
    }

    if let Some(raw) = &records.raw {
        if let Some(label) = clean_label(&raw.label) {
            if labels.admit(label) {
                buckets.scripts.push(Entry::raw_element(&raw.dom_id, label));
            }
        }
    }

    buckets
}
