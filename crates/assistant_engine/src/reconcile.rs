//! Visibility reconciliation of the action bar.
//!
//! Every pass strips the state classes from the whole document and derives
//! them again from the whitelist, so running it twice yields the same DOM.

use std::collections::{HashMap, HashSet};

use assistant_core::{SourceIdentity, SCRIPT_CONTAINER_PREFIX};
use assistant_logging::{qra_debug, qra_trace, LogCategory};

use crate::dom::{CLASS_HIDDEN, CLASS_WHITELISTED};
use crate::{Dom, EngineConfig, IdentityIndex, MixedContentPolicy, NodeHandle};

pub const CLASS_WRAPPER_VISIBLE: &str = "qrq-wrapper-visible";
pub const CLASS_MIXED_VISIBLE: &str = "qrq-mixed-visible";
pub const CLASS_BODY_ENABLED: &str = "qra-enabled";
pub const CLASS_BODY_DISABLED: &str = "qra-disabled";
/// Class the host gives every quick-reply button container.
pub const CLASS_SET_CONTAINER: &str = "qr--buttons";
/// Class of a single quick-reply button.
const CLASS_BUTTON: &str = "qr--button";
/// Id prefix of the host's input helper buttons.
const INPUT_HELPER_PREFIX: &str = "input_";

const STATE_CLASSES: [&str; 4] = [
    CLASS_HIDDEN,
    CLASS_WHITELISTED,
    CLASS_WRAPPER_VISIBLE,
    CLASS_MIXED_VISIBLE,
];

/// What one pass decided, by node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub enabled: bool,
    pub wrapper: Option<NodeHandle>,
    pub wrapper_visible: bool,
    pub whitelisted: Vec<NodeHandle>,
    pub mixed: Vec<NodeHandle>,
    pub hidden: Vec<NodeHandle>,
    pub protected: Vec<NodeHandle>,
    pub raw_hidden: Vec<NodeHandle>,
}

impl ReconcileReport {
    /// Containers left visible in the bar.
    pub fn visible_count(&self) -> usize {
        self.whitelisted.len() + self.mixed.len() + self.protected.len()
    }
}

/// The wrapper the host sometimes nests every set container in: a direct child
/// of the bar with the container class, no id, and container children.
pub fn find_wrapper(dom: &Dom, bar: NodeHandle, config: &EngineConfig) -> Option<NodeHandle> {
    dom.children(bar).into_iter().find(|&child| {
        let Some(element) = dom.element(child) else {
            return false;
        };
        let has_fixed_id = element.id.as_deref().is_some_and(|id| !id.is_empty());
        element.has_class(CLASS_SET_CONTAINER)
            && !has_fixed_id
            && dom.children(child).into_iter().any(|grandchild| {
                dom.element(grandchild).is_some_and(|g| {
                    g.has_class(CLASS_SET_CONTAINER) || g.id_starts_with(SCRIPT_CONTAINER_PREFIX)
                })
            })
            && !config.is_builtin_allowed(element.id.as_deref().unwrap_or_default())
    })
}

/// Why a host element is never hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protection {
    /// Allowlisted container; counts as a container under every policy.
    Builtin,
    /// Lone input helper button sitting directly in the id-less wrapper.
    InputHelper,
}

fn protection(dom: &Dom, config: &EngineConfig, node: NodeHandle) -> Option<Protection> {
    let element = dom.element(node)?;
    if element
        .id
        .as_deref()
        .is_some_and(|id| config.is_builtin_allowed(id))
    {
        return Some(Protection::Builtin);
    }
    let in_wrapper = dom
        .parent(node)
        .and_then(|parent| dom.element(parent))
        .is_some_and(|parent| {
            parent.has_class(CLASS_SET_CONTAINER)
                && parent.id.as_deref().unwrap_or_default().is_empty()
        });
    let helper =
        element.has_class(CLASS_BUTTON) && element.id_starts_with(INPUT_HELPER_PREFIX) && in_wrapper;
    helper.then_some(Protection::InputHelper)
}

fn is_container(dom: &Dom, index: &IdentityIndex, node: NodeHandle) -> bool {
    index.identity_of(node).is_some() || dom.has_class(node, CLASS_SET_CONTAINER)
}

fn reset(dom: &mut Dom) {
    let document = dom.document();
    let nodes: Vec<_> = std::iter::once(document)
        .chain(dom.descendants(document))
        .collect();
    for node in nodes {
        for class in STATE_CLASSES {
            dom.remove_class(node, class);
        }
    }
}

/// Applies the whitelist to the action bar.
///
/// Whitelisted containers are marked visible, the rest hidden, unless they
/// hold something that must stay visible. Built-in allowlisted elements are
/// left alone. Every instance of the raw element is hidden; it is reachable
/// from the popup instead.
pub fn reconcile(
    dom: &mut Dom,
    config: &EngineConfig,
    native_sets: &[(String, NodeHandle)],
    whitelist: &[SourceIdentity],
    enabled: bool,
) -> ReconcileReport {
    reset(dom);

    let document = dom.document();
    let (on, off) = if enabled {
        (CLASS_BODY_ENABLED, CLASS_BODY_DISABLED)
    } else {
        (CLASS_BODY_DISABLED, CLASS_BODY_ENABLED)
    };
    dom.add_class(document, on);
    dom.remove_class(document, off);

    let mut report = ReconcileReport {
        enabled,
        ..ReconcileReport::default()
    };
    if !enabled {
        qra_debug!(LogCategory::Whitelist; "assistant disabled, bar left untouched");
        return report;
    }

    if let Some(raw_id) = config.raw_element_id.as_deref() {
        for node in dom.find_all_by_id(document, raw_id) {
            dom.add_class(node, CLASS_HIDDEN);
            report.raw_hidden.push(node);
        }
    }

    let Some(bar) = dom.get_element_by_id(&config.bar_id) else {
        qra_debug!(LogCategory::Whitelist; "no #{} on the page yet", config.bar_id);
        return report;
    };
    let wrapper = find_wrapper(dom, bar, config);
    let index = IdentityIndex::build(dom, bar, native_sets);

    let descendants = dom.descendants(bar);
    let protected: HashMap<NodeHandle, Protection> = descendants
        .iter()
        .filter_map(|&n| protection(dom, config, n).map(|p| (n, p)))
        .collect();
    let containers: Vec<NodeHandle> = descendants
        .iter()
        .copied()
        .filter(|&n| Some(n) != wrapper && is_container(dom, &index, n))
        .collect();
    let whitelisted: HashSet<NodeHandle> = containers
        .iter()
        .copied()
        .filter(|&n| {
            index
                .identity_of(n)
                .is_some_and(|identity| whitelist.contains(identity))
        })
        .collect();
    let keeps_parent_visible = |node: NodeHandle| {
        whitelisted.contains(&node)
            || match protected.get(&node) {
                Some(Protection::Builtin) => true,
                Some(Protection::InputHelper) => {
                    config.mixed_content == MixedContentPolicy::DescendantScan
                }
                None => false,
            }
    };

    let mut decisions = Vec::with_capacity(containers.len());
    for &container in &containers {
        let decision = if protected.contains_key(&container) {
            Decision::Protected
        } else if whitelisted.contains(&container) {
            Decision::Whitelisted
        } else if dom
            .descendants(container)
            .into_iter()
            .any(&keeps_parent_visible)
        {
            Decision::Mixed
        } else {
            Decision::Hidden
        };
        decisions.push((container, decision));
    }
    report.protected = descendants
        .iter()
        .copied()
        .filter(|n| protected.contains_key(n))
        .collect();

    for (node, decision) in decisions {
        match decision {
            Decision::Protected => {}
            Decision::Whitelisted => {
                dom.add_class(node, CLASS_WHITELISTED);
                report.whitelisted.push(node);
            }
            Decision::Mixed => {
                dom.add_class(node, CLASS_MIXED_VISIBLE);
                report.mixed.push(node);
            }
            Decision::Hidden => {
                dom.add_class(node, CLASS_HIDDEN);
                report.hidden.push(node);
            }
        }
    }
    if let Some(wrapper) = wrapper {
        let visible = report
            .whitelisted
            .iter()
            .chain(&report.mixed)
            .chain(&report.protected)
            .any(|&node| dom.contains(wrapper, node));
        dom.add_class(
            wrapper,
            if visible {
                CLASS_WRAPPER_VISIBLE
            } else {
                CLASS_HIDDEN
            },
        );
        report.wrapper = Some(wrapper);
        report.wrapper_visible = visible;
    }

    qra_debug!(
        LogCategory::Whitelist;
        "reconciled {} containers: {} whitelisted, {} mixed, {} hidden",
        containers.len(),
        report.whitelisted.len(),
        report.mixed.len(),
        report.hidden.len()
    );
    qra_trace!(LogCategory::Whitelist; "bar after reconcile:\n{}", dom.structure(bar));
    report
}

#[derive(Debug, Clone, Copy)]
enum Decision {
    Protected,
    Whitelisted,
    Mixed,
    Hidden,
}
