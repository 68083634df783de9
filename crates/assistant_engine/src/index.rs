use std::collections::HashMap;

use assistant_core::SourceIdentity;
use assistant_logging::{qra_debug, LogCategory};

use crate::{Dom, NodeHandle};

/// Container to identity join for one reconciliation pass.
///
/// Built fresh every pass from attached nodes only, so handles held by
/// providers for containers that have since been removed never match.
#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    by_node: HashMap<NodeHandle, SourceIdentity>,
    by_identity: HashMap<SourceIdentity, Vec<NodeHandle>>,
}

impl IdentityIndex {
    /// Indexes script-runner containers under `scope` by element id and native
    /// sets by the back-references their provider holds.
    pub fn build(dom: &Dom, scope: NodeHandle, native_sets: &[(String, NodeHandle)]) -> Self {
        let mut index = Self::default();
        for (name, node) in native_sets {
            if !dom.is_attached(*node) || !dom.contains(scope, *node) {
                qra_debug!(LogCategory::Core; "ignoring stale container of native set {name}");
                continue;
            }
            index.insert(*node, SourceIdentity::native_set(name));
        }
        for node in dom.descendants(scope) {
            let identity = dom
                .element(node)
                .and_then(|e| e.id.as_deref())
                .and_then(SourceIdentity::from_script_container_id);
            if let Some(identity) = identity {
                index.insert(node, identity);
            }
        }
        index
    }

    fn insert(&mut self, node: NodeHandle, identity: SourceIdentity) {
        if self.by_node.contains_key(&node) {
            return;
        }
        self.by_identity
            .entry(identity.clone())
            .or_default()
            .push(node);
        self.by_node.insert(node, identity);
    }

    pub fn identity_of(&self, node: NodeHandle) -> Option<&SourceIdentity> {
        self.by_node.get(&node)
    }

    pub fn nodes_of(&self, identity: &SourceIdentity) -> &[NodeHandle] {
        self.by_identity
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}
