//! Restoring whitelisted script containers the host removed.
//!
//! The host re-renders the action bar from scratch and sometimes drops
//! script-runner containers that are still valid. The healer remembers a
//! detached-safe handle and the next sibling of every whitelisted container it
//! has seen, and puts a deep copy back when the original disappears.

use std::collections::{HashMap, HashSet};

use assistant_core::SourceIdentity;
use assistant_logging::{qra_debug, qra_info, qra_warn, LogCategory};

use crate::reconcile::find_wrapper;
use crate::{Dom, EngineConfig, NodeHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverySnapshot {
    pub node: NodeHandle,
    pub next_sibling: Option<NodeHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryCache {
    entries: HashMap<SourceIdentity, RecoverySnapshot>,
}

impl RecoveryCache {
    pub fn get(&self, identity: &SourceIdentity) -> Option<&RecoverySnapshot> {
        self.entries.get(identity)
    }

    pub fn contains(&self, identity: &SourceIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn capture(&mut self, dom: &Dom, identity: SourceIdentity, node: NodeHandle) {
        self.entries.insert(
            identity,
            RecoverySnapshot {
                node,
                next_sibling: dom.next_sibling(node),
            },
        );
    }

    /// Re-reads the sibling anchor of every cached node still on the page.
    ///
    /// Runs after a restoring pass, once the host has settled, so the next
    /// restoration lands next to whatever the host rendered since.
    pub fn refresh_anchors(&mut self, dom: &Dom) {
        for snapshot in self.entries.values_mut() {
            if dom.is_attached(snapshot.node) {
                snapshot.next_sibling = dom.next_sibling(snapshot.node);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealOutcome {
    /// Restored next to their cached sibling.
    pub restored: Vec<SourceIdentity>,
    /// Restored at the end of the target parent because the anchor was gone.
    pub appended: Vec<SourceIdentity>,
}

impl HealOutcome {
    pub fn restored_count(&self) -> usize {
        self.restored.len() + self.appended.len()
    }
}

/// One healing pass.
///
/// `valid_script_ids` are the scripts the runner currently reports; a
/// whitelisted container whose script is gone is forgotten rather than
/// restored. Does nothing while the assistant is disabled.
pub fn heal(
    dom: &mut Dom,
    cache: &mut RecoveryCache,
    config: &EngineConfig,
    whitelist: &[SourceIdentity],
    valid_script_ids: &HashSet<String>,
    enabled: bool,
) -> HealOutcome {
    let mut outcome = HealOutcome::default();
    if !enabled {
        cache.clear();
        return outcome;
    }
    let Some(bar) = dom.get_element_by_id(&config.bar_id) else {
        qra_debug!(LogCategory::Update; "no #{}, nothing to heal", config.bar_id);
        return outcome;
    };
    let target_parent = find_wrapper(dom, bar, config).unwrap_or(bar);

    cache.entries.retain(|identity, _| whitelist.contains(identity));

    for identity in whitelist {
        let (Some(script_id), Some(container_id)) =
            (identity.script_id(), identity.script_container_id())
        else {
            continue;
        };
        if !valid_script_ids.contains(script_id) {
            if cache.entries.remove(identity).is_some() {
                qra_debug!(LogCategory::Update; "script {script_id} is gone, dropping its snapshot");
            }
            continue;
        }
        if let Some(node) = dom.get_element_by_id(&container_id) {
            cache.capture(dom, identity.clone(), node);
            continue;
        }

        let Some(snapshot) = cache.get(identity).copied() else {
            qra_debug!(LogCategory::Update; "{identity} missing and never seen");
            continue;
        };
        let copy = match dom.deep_clone(snapshot.node) {
            Ok(copy) => copy,
            Err(err) => {
                qra_warn!(LogCategory::Update; "cannot copy {identity}: {err}");
                continue;
            }
        };
        let anchored = snapshot
            .next_sibling
            .filter(|&sibling| dom.is_attached(sibling))
            .is_some_and(|sibling| dom.insert_before(target_parent, copy, sibling).is_ok());
        if anchored {
            outcome.restored.push(identity.clone());
        } else {
            if let Err(err) = dom.append_child(target_parent, copy) {
                qra_warn!(LogCategory::Update; "cannot restore {identity}: {err}");
                continue;
            }
            qra_warn!(LogCategory::Update; "anchor for {identity} is gone, appended instead");
            outcome.appended.push(identity.clone());
        }
        cache.capture(dom, identity.clone(), copy);
    }

    if outcome.restored_count() > 0 {
        qra_info!(LogCategory::Update; "restored {} whitelisted containers", outcome.restored_count());
    }
    outcome
}
