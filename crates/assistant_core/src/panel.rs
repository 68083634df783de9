use std::collections::HashSet;

use crate::{resolve_identity, EntryBuckets, EntrySource, Scope, SourceIdentity, SourceKind};

/// Prefix shown before task names in the whitelist panel.
pub const TASK_DISPLAY_PREFIX: &str = "XB-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistCandidate {
    pub identity: SourceIdentity,
    pub display_name: String,
    pub kind: SourceKind,
    pub scope: Scope,
}

/// Whitelist management lists: containers that collapse into the popup and
/// containers kept in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhitelistPanel {
    pub available: Vec<WhitelistCandidate>,
    pub whitelisted: Vec<WhitelistCandidate>,
}

/// One candidate per distinct identity in `buckets`, first occurrence wins.
pub fn whitelist_panel(buckets: &EntryBuckets, whitelist: &[SourceIdentity]) -> WhitelistPanel {
    let mut panel = WhitelistPanel::default();
    let mut seen = HashSet::new();

    for entry in buckets.iter() {
        let Some(identity) = resolve_identity(entry) else {
            continue;
        };
        if !seen.insert(identity.clone()) {
            continue;
        }
        let display_name = match &entry.source {
            EntrySource::TaskPlugin {
                task_name,
                character_set,
                ..
            } => {
                if *character_set {
                    format!("{TASK_DISPLAY_PREFIX}{}", entry.set_name)
                } else {
                    format!("{TASK_DISPLAY_PREFIX}{task_name}")
                }
            }
            _ if entry.set_name.is_empty() => entry.label.clone(),
            _ => entry.set_name.clone(),
        };
        let scope = identity.task_scope().unwrap_or(entry.scope);
        let candidate = WhitelistCandidate {
            display_name,
            kind: entry.kind(),
            scope,
            identity,
        };
        if whitelist.contains(&candidate.identity) {
            panel.whitelisted.push(candidate);
        } else {
            panel.available.push(candidate);
        }
    }

    panel
}
